mod shared;
mod tui;
mod audio_api;
mod audio;
mod config;
mod error;
mod loader;
mod middle;
mod sequencer;

use std::path::Path;
use std::time::{Duration, Instant};
use crossterm::terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use audio_api::AudioCommand;
use config::Settings;
use loader::kit::DEFAULT_KIT;
use loader::KitDescriptor;
use middle::Middle;
use shared::InputEvent;

const LOG_FILE: &str = "beatseq.log";
const IDLE_POLL: Duration = Duration::from_millis(50); // while stopped nothing is due

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

// the terminal belongs to the tui, so logs go to a file
fn init_logging() -> anyhow::Result<()> {
    let file = std::fs::File::create(LOG_FILE)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run() -> anyhow::Result<()> {
    init_logging()?;

    // beatseq [kit name | kit.json] [settings.json]
    let mut args = std::env::args().skip(1);
    let kit = KitDescriptor::resolve(&args.next().unwrap_or_else(|| DEFAULT_KIT.to_string()))?;
    let settings = match args.next() {
        Some(path) => config::load_settings(Path::new(&path))?,
        None => Settings::default(),
    };
    log::info!("kit '{}' with {} voices, {:?}", kit.name, kit.voice_count(), settings);

    let mut audio = audio::start_audio()?;
    let mut middle = Middle::new(&kit, &settings);

    let samples = loader::sample_loader::load_kit_samples(&kit, audio.sample_rate());
    for (voice, loaded) in samples.into_iter().enumerate() {
        if let Some((id, buffer)) = loaded {
            audio.send(AudioCommand::RegisterSample { id, buffer });
            middle.attach_sample(voice, id);
        }
    }

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    // the handle is both the clock and the player
    let clock = audio.clock().clone();
    let mut tui_state = tui::mode::TuiState::default();

    loop {
        middle.tick(&clock, &mut audio, Instant::now());

        let ds = middle.display_state();
        tui_state.sync(&ds);
        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds, &tui_state);
        })?;

        // sleep in the input poll until the next task is due
        let timeout = middle
            .next_wake(Instant::now())
            .map_or(IDLE_POLL, |d| d.min(IDLE_POLL));
        let events = tui::input::poll_input(timeout, &mut tui_state)?;
        for event in events {
            if event == InputEvent::Quit {
                log::info!("quit");
                drop(term);
                drop(audio);
                return Ok(());
            }
            let cmds = middle.handle_input(event, &clock, Instant::now());
            for cmd in cmds {
                audio.send(cmd);
            }
        }
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
