//! Engine facade and run lifecycle operations.

use crate::driver;
use crate::read_model::ReadModel;
use parking_lot::{Mutex, RwLock};
use robogrid_core::{EngineConfig, Error, LevelConfig, Result};
use robogrid_lang::compile;
use robogrid_runtime::{CommandTable, Vm};
use robogrid_sim::RunState;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

type SuccessHook = Box<dyn Fn() + Send + Sync>;

/// State shared between the engine facade and driver tasks.
pub(crate) struct Shared {
    pub(crate) config: EngineConfig,
    pub(crate) level: RwLock<LevelConfig>,
    run_seq: AtomicU64,
    pub(crate) state: Mutex<RunState>,
    tx: watch::Sender<ReadModel>,
    pub(crate) on_success: SuccessHook,
}

impl Shared {
    /// True while `run_id` is still the live generation.
    pub(crate) fn is_current(&self, run_id: u64) -> bool {
        self.run_seq.load(Ordering::SeqCst) == run_id
    }

    fn bump(&self) -> u64 {
        self.run_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publish a snapshot of `state`. Callers hold the state lock, so
    /// snapshots go out in the order the mutations happened.
    pub(crate) fn publish(&self, state: &RunState) {
        self.tx.send_replace(ReadModel::from(state));
    }
}

/// One level, at most one active run.
pub struct GameEngine {
    shared: Arc<Shared>,
}

impl GameEngine {
    /// Build an engine for a validated level.
    ///
    /// `on_success` fires exactly once per winning run.
    pub fn new(
        level: LevelConfig,
        config: EngineConfig,
        on_success: impl Fn() + Send + Sync + 'static,
    ) -> Result<Self> {
        level.validate()?;
        let state = RunState::fresh(&level, 0, config.default_speed_ms);
        let (tx, _rx) = watch::channel(ReadModel::from(&state));
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                level: RwLock::new(level),
                run_seq: AtomicU64::new(0),
                state: Mutex::new(state),
                tx,
                on_success: Box::new(on_success),
            }),
        })
    }

    /// Receive every published snapshot from now on.
    pub fn subscribe(&self) -> watch::Receiver<ReadModel> {
        self.shared.tx.subscribe()
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> ReadModel {
        self.shared.tx.borrow().clone()
    }

    pub fn level(&self) -> LevelConfig {
        self.shared.level.read().clone()
    }

    /// Compile `source` and start a run. Returns the new run id, or `None`
    /// while a run is already active (the call is then a no-op).
    ///
    /// Compilation happens synchronously: a compile error surfaces in the
    /// published state and no driver task is spawned.
    pub fn run_code(&self, source: &str) -> Option<u64> {
        let level = self.shared.level.read().clone();
        let mut state = self.shared.state.lock();
        if state.is_running {
            debug!("run_code ignored: a run is already active");
            return None;
        }

        let run_id = self.shared.bump();
        let mut fresh = RunState::fresh(&level, run_id, self.shared.config.default_speed_ms);

        match compile(source) {
            Ok(program) => {
                fresh.is_running = true;
                *state = fresh;
                self.shared.publish(&state);
                drop(state);

                info!(run_id, level = %level.id, "Starting run");
                let vm = Vm::new(program, CommandTable::for_level(&level.available_commands));
                let shared = Arc::clone(&self.shared);
                tokio::spawn(driver::drive(shared, vm, run_id));
            }
            Err(e) => {
                debug!(run_id, error = %e, "Compile failed");
                fresh.fail(Error::Compile(e.to_string()).to_string());
                *state = fresh;
                self.shared.publish(&state);
            }
        }
        Some(run_id)
    }

    /// Flip the pause flag of the active run. No effect when idle.
    pub fn toggle_pause(&self) {
        let mut state = self.shared.state.lock();
        if state.is_running {
            state.is_paused = !state.is_paused;
            debug!(paused = state.is_paused, "Pause toggled");
            self.shared.publish(&state);
        }
    }

    /// Cancel any active run and restore the level's initial state.
    pub fn reset(&self) {
        let level = self.shared.level.read().clone();
        let run_id = self.shared.bump();
        let mut state = self.shared.state.lock();
        *state = RunState::fresh(&level, run_id, self.shared.config.default_speed_ms);
        self.shared.publish(&state);
        debug!(run_id, "Reset");
    }

    /// Swap in a new level, cancelling any active run.
    pub fn force_reset(&self, new_level: LevelConfig) -> Result<()> {
        new_level.validate()?;
        info!(level = %new_level.id, "Switching level");
        {
            let mut level = self.shared.level.write();
            *level = new_level;
        }
        self.reset();
        Ok(())
    }
}
