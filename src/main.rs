//! Planet Drift headless host
//!
//! Starts the engine thread and runs a presentation loop next to it that reads
//! snapshots at its own frame rate and reports the HUD through the log. An
//! optional autopilot steers the player so the control path gets exercised.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;

use planet_drift::{BroadPhase, EngineHandle, SimConfig, Threat, WorldSnapshot};

#[derive(Parser, Debug)]
#[command(name = "planet-drift", about = "Toroidal planet absorption simulation")]
struct Args {
    /// JSON config file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<f32>,

    #[arg(long)]
    height: Option<f32>,

    #[arg(long)]
    min_bodies: Option<usize>,

    #[arg(long)]
    max_bodies: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// bounding_box or grid
    #[arg(long, value_parser = parse_broad_phase)]
    broad_phase: Option<BroadPhase>,

    /// Seconds to run before exiting
    #[arg(long, default_value_t = 30)]
    duration: u64,

    /// Presentation frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Steer the player away from the nearest bigger body
    #[arg(long, default_value_t = false)]
    autopilot: bool,

    /// Start a new game automatically after game over
    #[arg(long, default_value_t = false)]
    restart: bool,

    /// Write the final snapshot as JSON to this file
    #[arg(long)]
    dump: Option<PathBuf>,
}

fn parse_broad_phase(s: &str) -> Result<BroadPhase, String> {
    BroadPhase::from_str(s).ok_or_else(|| format!("unknown broad phase `{s}`"))
}

fn build_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SimConfig::default(),
    };

    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(min) = args.min_bodies {
        config.min_bodies = min;
    }
    if let Some(max) = args.max_bodies {
        config.max_bodies = max;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(broad_phase) = args.broad_phase {
        config.broad_phase = broad_phase;
    }

    config.validate()?;
    Ok(config)
}

/// Point to "click" so the player is pushed away from the nearest threat
fn autopilot_target(snapshot: &WorldSnapshot) -> Option<Vec2> {
    let player = snapshot.player()?;
    snapshot
        .bodies
        .iter()
        .filter(|b| matches!(snapshot.classify(b), Threat::Bigger | Threat::Comparable(_)))
        .min_by(|a, b| {
            let da = a.pos.distance_squared(player.pos);
            let db = b.pos.distance_squared(player.pos);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|threat| threat.pos)
}

fn log_hud(snapshot: &WorldSnapshot) {
    match snapshot.player() {
        Some(player) => log::info!(
            "tick {:>7} | bodies {:>5} | player r={:.1} m={:.1} at ({:.0}, {:.0}) | speed {:.0}%",
            snapshot.tick,
            snapshot.bodies.len(),
            player.radius,
            player.mass,
            player.pos.x,
            player.pos.y,
            snapshot.time_scale_percent()
        ),
        None => log::info!(
            "tick {:>7} | bodies {:>5} | GAME OVER",
            snapshot.tick,
            snapshot.bodies.len()
        ),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = build_config(&args)?;

    log::info!(
        "Planet Drift (headless) starting on a {}x{} plane, {} broad phase",
        config.width,
        config.height,
        config.broad_phase.as_str()
    );
    let engine = EngineHandle::spawn(config).context("starting engine")?;

    let frame = Duration::from_secs_f64(1.0 / args.fps.max(1) as f64);
    let deadline = Instant::now() + Duration::from_secs(args.duration);
    let mut last_hud = Instant::now();
    let mut was_over = false;
    let mut frames: u64 = 0;

    while Instant::now() < deadline {
        let snapshot = engine.snapshot();
        let over = snapshot.is_game_over();

        if over && !was_over {
            log::warn!("Game over at tick {}", snapshot.tick);
            if args.restart {
                engine.reset_world();
            }
        }
        was_over = over;

        // Autopilot "clicks" twice a second
        if args.autopilot && frames % (args.fps.max(1) as u64 / 2).max(1) == 0 {
            if let Some(target) = autopilot_target(&snapshot) {
                engine.apply_thrust(target);
            }
        }

        if last_hud.elapsed() >= Duration::from_secs(1) {
            log_hud(&snapshot);
            last_hud = Instant::now();
        }

        frames += 1;
        thread::sleep(frame);
    }

    let last = engine.snapshot();
    engine.shutdown();

    if let Some(path) = &args.dump {
        let json = last.to_json().context("serializing final snapshot")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Final snapshot written to {}", path.display());
    }
    Ok(())
}
