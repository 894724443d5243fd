//! Mineshaft headless runner.
//!
//! Builds the level described by the config and level files, then runs a
//! fixed number of frames with a scripted autopilot instead of a keyboard:
//! - walk forward the whole run, with footsteps bound to `W`
//! - nudge health up once and down once
//! - pause with Escape partway through and resume with O
//!
//! A summary is logged at the end. With `--trace`, every event published
//! during the run is written as JSON lines.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run --release -- --frames 900 --trace trace.jsonl
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use mineshaft::error::EngineError;
use mineshaft::game::{Game, LevelData};
use mineshaft::resources::gameconfig::GameConfig;
use mineshaft::resources::input::Key;
use mineshaft::systems::render::DrawList;
use mineshaft::systems::trace::EventRecorder;

#[derive(Parser)]
#[command(version, about = "Mineshaft: collect the nuggets before your health runs out.")]
struct Cli {
    /// INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "assets/config.ini")]
    config: PathBuf,

    /// Level description, overriding the config.
    #[arg(long, value_name = "PATH")]
    level: Option<PathBuf>,

    /// Number of frames to simulate, overriding the config.
    #[arg(long)]
    frames: Option<u64>,

    /// Seed for scattered pickups, overriding the config.
    #[arg(long)]
    seed: Option<u64>,

    /// Pickups scattered on top of the ones the level places.
    #[arg(long)]
    extra_pickups: Option<u32>,

    /// Write the event trace to this file.
    #[arg(long, value_name = "PATH")]
    trace: Option<PathBuf>,
}

/// Keys held on `frame` by the autopilot.
fn autopilot(frame: u64, frames: u64) -> Vec<Key> {
    let pause_at = frames / 2;
    let mut held = Vec::with_capacity(2);
    match frame {
        f if f == pause_at => held.push(Key::Escape),
        f if f == pause_at + 30 => held.push(Key::O),
        f if f > pause_at && f < pause_at + 30 => {}
        _ => held.push(Key::W),
    }
    match frame {
        10 => held.push(Key::Up),
        20 => held.push(Key::Down),
        _ => {}
    }
    held
}

fn run(cli: Cli) -> Result<(), EngineError> {
    let mut config = match GameConfig::load_from_file(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            info!("{}; using defaults", err);
            GameConfig::new()
        }
    };
    if let Some(level) = cli.level {
        config.level_path = level;
    }
    if let Some(frames) = cli.frames {
        config.frames = frames;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(extra) = cli.extra_pickups {
        config.extra_pickups = extra;
    }

    let level = LevelData::load_from_file(&config.level_path)?;
    let mut game = Game::build(&config, &level)?;
    let recorder = cli.trace.as_ref().map(|_| EventRecorder::attach(game.bus()));

    let mut sink = DrawList::new();
    let mut contacts = 0;
    let mut captured = 0;
    let mut frames_run = 0;
    for frame in 0..config.frames {
        sink.clear();
        let report = game.tick(&autopilot(frame, config.frames), &mut sink);
        contacts += report.contacts;
        captured += game.drain_audio_commands().len();
        frames_run += 1;
        if report.state.is_finished() {
            info!("Game over at frame {}: {:?}", report.frame, report.state);
            break;
        }
    }

    info!(
        "Ran {} frames: state={:?}, health={:?}, pickups left={}/{}, contacts={}, events={}",
        frames_run,
        game.state(),
        game.health(),
        game.remaining_pickups(),
        game.pickups().len(),
        contacts,
        game.bus().published_count()
    );
    info!(
        "Audio: {} cue requests forwarded, {} ignored, {} acknowledgements, {} captured; last draw list had {} commands",
        game.sounds().forwarded(),
        game.sounds().ignored(),
        game.audio_acknowledged() + game.poll_audio_messages().len() as u64,
        captured,
        sink.len()
    );

    if let (Some(path), Some(recorder)) = (&cli.trace, &recorder) {
        recorder.write_to(path)?;
    }
    drop(recorder);
    game.shutdown()
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
