//! Engine thread and the boundary it shares with presentation code
//!
//! The engine thread owns the [`Simulation`] outright. Presentation code talks
//! to it through two channels only:
//! - control: [`ControlCommand`]s sent over an mpsc channel and applied at the
//!   start of the next tick
//! - read: an `Arc<WorldSnapshot>` swapped in after every tick
//!
//! Population changes (absorption, reset) happen entirely on the engine
//! thread between snapshot publications, so a reader never sees a half
//! updated body or a population in the middle of removal.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use glam::Vec2;

use crate::settings::{ConfigError, SimConfig};
use crate::sim::Simulation;
use crate::snapshot::WorldSnapshot;

/// Requests from the presentation layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlCommand {
    /// Push the player away from a point on the plane
    ApplyThrust { target: Vec2 },
    /// Multiply time scale by `1 + delta / 10`
    AdjustTimeScale { delta: f32 },
    ResetTimeScale,
    /// Discard the population and generate a new one
    ResetWorld,
}

impl ControlCommand {
    /// Apply to a simulation owned by the calling thread
    pub fn apply(self, sim: &mut Simulation) {
        match self {
            ControlCommand::ApplyThrust { target } => {
                sim.apply_thrust(target);
            }
            ControlCommand::AdjustTimeScale { delta } => sim.set_time_scale(delta),
            ControlCommand::ResetTimeScale => sim.reset_time_scale(),
            ControlCommand::ResetWorld => {
                log::info!("Resetting world");
                sim.reset_world();
            }
        }
    }
}

/// Why an engine could not be started
#[derive(Debug)]
pub enum EngineError {
    Config(ConfigError),
    Spawn(std::io::Error),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Config(e) => write!(f, "{e}"),
            EngineError::Spawn(e) => write!(f, "failed to spawn engine thread: {e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Config(e) => Some(e),
            EngineError::Spawn(e) => Some(e),
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        EngineError::Config(e)
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Spawn(e)
    }
}

/// Latest published snapshot
struct SnapshotSlot(Mutex<Arc<WorldSnapshot>>);

impl SnapshotSlot {
    fn new(snapshot: WorldSnapshot) -> Self {
        Self(Mutex::new(Arc::new(snapshot)))
    }

    fn lock(&self) -> MutexGuard<'_, Arc<WorldSnapshot>> {
        // A panicking writer can only have left a complete snapshot behind
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load(&self) -> Arc<WorldSnapshot> {
        Arc::clone(&self.lock())
    }

    fn store(&self, snapshot: WorldSnapshot) {
        *self.lock() = Arc::new(snapshot);
    }
}

/// Handle to a running engine thread
///
/// Dropping the handle stops the thread and waits for it.
pub struct EngineHandle {
    commands: Sender<ControlCommand>,
    snapshot: Arc<SnapshotSlot>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl EngineHandle {
    /// Validate `config`, generate a world from it and start stepping it
    pub fn spawn(config: SimConfig) -> Result<Self, EngineError> {
        Self::spawn_with(Simulation::new(config)?)
    }

    /// Start stepping an existing simulation
    pub fn spawn_with(sim: Simulation) -> Result<Self, EngineError> {
        let (commands, inbox) = mpsc::channel();
        let snapshot = Arc::new(SnapshotSlot::new(WorldSnapshot::capture(&sim)));
        let running = Arc::new(AtomicBool::new(true));

        let worker = {
            let snapshot = Arc::clone(&snapshot);
            let running = Arc::clone(&running);
            thread::Builder::new()
                .name("planet-engine".into())
                .spawn(move || run_engine(sim, inbox, snapshot, running))?
        };

        log::info!("Engine thread started");
        Ok(Self {
            commands,
            snapshot,
            running,
            worker: Some(worker),
        })
    }

    /// Most recent complete state
    pub fn snapshot(&self) -> Arc<WorldSnapshot> {
        self.snapshot.load()
    }

    /// Queue a command for the next tick; false if the engine has stopped
    pub fn send(&self, command: ControlCommand) -> bool {
        if self.commands.send(command).is_err() {
            log::warn!("Engine stopped, dropping {command:?}");
            return false;
        }
        true
    }

    pub fn apply_thrust(&self, target: Vec2) -> bool {
        self.send(ControlCommand::ApplyThrust { target })
    }

    pub fn set_time_scale(&self, delta: f32) -> bool {
        self.send(ControlCommand::AdjustTimeScale { delta })
    }

    pub fn reset_time_scale(&self) -> bool {
        self.send(ControlCommand::ResetTimeScale)
    }

    pub fn reset_world(&self) -> bool {
        self.send(ControlCommand::ResetWorld)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Stop the engine and wait for the thread to exit
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Engine thread panicked");
            } else {
                log::info!("Engine thread stopped");
            }
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_engine(
    mut sim: Simulation,
    inbox: Receiver<ControlCommand>,
    snapshot: Arc<SnapshotSlot>,
    running: Arc<AtomicBool>,
) {
    let pause = Duration::from_millis(sim.config().tick_interval_ms);

    while running.load(Ordering::Relaxed) {
        for command in inbox.try_iter() {
            command.apply(&mut sim);
        }

        sim.tick();
        snapshot.store(WorldSnapshot::capture(&sim));

        if !pause.is_zero() {
            thread::sleep(pause);
        }
    }
}
