use thiserror::Error;

/// Errors raised by the sequencer core when a request can't be honoured.
#[derive(Debug, Error, PartialEq)]
pub enum SeqError {
    #[error("tempo must be a finite number of beats per minute, got {0}")]
    InvalidTempo(f32),

    #[error("voice {voice} out of range (kit has {count} voices)")]
    VoiceOutOfRange { voice: usize, count: usize },

    #[error("step {step} out of range (pattern has {count} steps)")]
    StepOutOfRange { step: usize, count: usize },

    #[error("unknown kit '{0}'")]
    UnknownKit(String),

    #[error("invalid kit descriptor: {0}")]
    InvalidKit(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Reasons a voice player can refuse a scheduled trigger. These never leave
/// the scheduling loop; the voice is just silent for that step.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PlayError {
    #[error("sample not loaded")]
    SampleNotReady,

    #[error("audio command queue is full")]
    QueueFull,

    #[error("audio engine is gone")]
    Disconnected,
}
