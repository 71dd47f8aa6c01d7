pub mod animation;
pub mod pattern;
pub mod queue;
pub mod scheduler;
pub mod task;
pub mod transport;

#[cfg(test)]
pub mod test_fixture;

pub use animation::AnimationConsumer;
pub use queue::StepQueue;
pub use scheduler::{LookaheadScheduler, SchedulerReport};
pub use task::RepeatingTask;
pub use transport::Transport;
