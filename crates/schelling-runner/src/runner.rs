//! Fixed-delay tick scheduling with cancellation.

use parking_lot::Mutex;
use schelling_core::{
    validate_ratio, CellCensus, Error, Parameter, Result, RunId, RunnerConfig, SimulationConfig,
};
use schelling_world::{SimulationDriver, StepOutcome};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Snapshot of the driver published after every tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunnerStatus {
    pub run_id: RunId,
    pub running: bool,
    pub tick_count: u64,
    pub unhappy_count: usize,
    pub census: CellCensus,
    /// Failure of the last tick; cleared by the next start or reset
    pub error: Option<String>,
}

impl RunnerStatus {
    fn from_driver(driver: &SimulationDriver, error: Option<String>) -> Self {
        Self {
            run_id: driver.run_id(),
            running: driver.is_running(),
            tick_count: driver.tick_count(),
            unhappy_count: driver.unhappy_count(),
            census: driver.census(),
            error,
        }
    }
}

/// Runs a [`SimulationDriver`] on a tokio task, one tick per `tick_delay`.
///
/// Each start gets its own cancellation token. The tick task re-checks the
/// token after taking the driver lock, so a tick whose delay elapsed just
/// before [`stop`](Self::stop) never touches the grid, and a task left over
/// from an earlier start never ticks a restarted simulation.
pub struct SimulationRunner {
    driver: Arc<Mutex<SimulationDriver>>,
    tick_delay: Duration,
    cancel: CancellationToken,
    task: Option<JoinHandle<Result<()>>>,
    status: Arc<watch::Sender<RunnerStatus>>,
}

impl SimulationRunner {
    pub fn new(driver: SimulationDriver, config: &RunnerConfig) -> Self {
        let (status, _) = watch::channel(RunnerStatus::from_driver(&driver, None));
        Self {
            driver: Arc::new(Mutex::new(driver)),
            tick_delay: config.tick_delay(),
            cancel: CancellationToken::new(),
            task: None,
            status: Arc::new(status),
        }
    }

    pub fn from_config(simulation: SimulationConfig, config: &RunnerConfig) -> Result<Self> {
        Ok(Self::new(SimulationDriver::new(simulation)?, config))
    }

    /// Begin ticking. Must be called from within a tokio runtime.
    ///
    /// Does nothing if a tick task is already live.
    #[instrument(skip(self))]
    pub fn start(&mut self) {
        if self.is_active() {
            return;
        }

        self.cancel = CancellationToken::new();
        {
            let mut driver = self.driver.lock();
            driver.start();
            self.publish(&driver, false);
        }

        let task = tokio::spawn(tick_loop(
            Arc::clone(&self.driver),
            self.cancel.clone(),
            self.tick_delay,
            Arc::clone(&self.status),
        ));
        self.task = Some(task);
        info!(tick_delay_ms = self.tick_delay.as_millis() as u64, "Runner started");
    }

    /// Stop ticking. A pending tick is discarded.
    #[instrument(skip(self))]
    pub fn stop(&mut self) {
        self.cancel.cancel();
        let mut driver = self.driver.lock();
        driver.stop();
        self.publish(&driver, true);
    }

    /// Stop and regenerate the grid
    pub fn reset(&mut self) -> Result<()> {
        self.stop();
        let mut driver = self.driver.lock();
        driver.reset()?;
        self.publish(&driver, false);
        Ok(())
    }

    /// Apply a parameter change. Ratio changes stop the runner before the grid is regenerated.
    pub fn set_parameter(&mut self, parameter: Parameter, value: f64) -> Result<()> {
        validate_ratio(parameter, value)?;
        if parameter.requires_reset() {
            self.stop();
        }
        let mut driver = self.driver.lock();
        driver.set_parameter(parameter, value)?;
        self.publish(&driver, !parameter.requires_reset());
        Ok(())
    }

    /// Wait for the tick task to finish. Returns the tick error if the run
    /// ended in a failed tick; `Ok` on equilibrium or stop.
    pub async fn wait(&mut self) -> Result<()> {
        if let Some(task) = self.task.as_mut() {
            let joined = task.await;
            self.task = None;
            joined.map_err(|e| Error::InvalidState(format!("tick task failed: {}", e)))??;
        }
        Ok(())
    }

    /// Whether a tick task is still live
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished()) && !self.cancel.is_cancelled()
    }

    /// Latest published snapshot, including any tick failure not yet cleared
    pub fn status(&self) -> RunnerStatus {
        self.status.borrow().clone()
    }

    /// Receive a status snapshot after every tick and control call
    pub fn subscribe(&self) -> watch::Receiver<RunnerStatus> {
        self.status.subscribe()
    }

    /// Read the driver under its lock
    pub fn with_driver<T>(&self, f: impl FnOnce(&SimulationDriver) -> T) -> T {
        f(&self.driver.lock())
    }

    pub fn tick_delay(&self) -> Duration {
        self.tick_delay
    }

    fn publish(&self, driver: &SimulationDriver, keep_error: bool) {
        let error = if keep_error {
            self.status.borrow().error.clone()
        } else {
            None
        };
        self.status.send_replace(RunnerStatus::from_driver(driver, error));
    }
}

impl Drop for SimulationRunner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn tick_loop(
    driver: Arc<Mutex<SimulationDriver>>,
    cancel: CancellationToken,
    tick_delay: Duration,
    status: Arc<watch::Sender<RunnerStatus>>,
) -> Result<()> {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(tick_delay) => {}
        }

        let outcome = {
            let mut guard = driver.lock();
            if cancel.is_cancelled() {
                debug!("Discarding tick scheduled before stop");
                break;
            }
            let outcome = guard.step();
            let error = outcome.as_ref().err().map(ToString::to_string);
            status.send_replace(RunnerStatus::from_driver(&guard, error));
            outcome
        };

        match outcome {
            Ok(StepOutcome::Advanced { unhappy_count }) => {
                crate::record_gauge!("unhappy_agents", unhappy_count);
            }
            Ok(StepOutcome::Equilibrium) => {
                crate::record_counter!("equilibria_reached", 1);
                break;
            }
            Ok(StepOutcome::Idle) => {
                warn!("Driver stopped outside the runner");
                break;
            }
            Err(e) => {
                error!(error = %e, "Tick failed; runner halted");
                return Err(e);
            }
        }
    }
    Ok(())
}
