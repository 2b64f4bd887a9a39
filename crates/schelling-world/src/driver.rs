//! Driver that owns a running simulation: grid, parameters, RNG and counters.

use crate::grid::Grid;
use crate::tick::TickEngine;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use schelling_core::{
    BoundaryPolicy, CellCensus, Error, Kind, Parameter, Result, RunId, SimulationConfig,
    SimulationParameters, Slot,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// What a call to [`SimulationDriver::step`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The driver is stopped; nothing changed
    Idle,
    /// The grid was replaced
    Advanced { unhappy_count: usize },
    /// The tick changed nothing; the driver stopped itself
    Equilibrium,
}

/// Summary of a synchronous run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub ticks: u64,
    pub settled: bool,
    pub final_unhappy: usize,
    pub census: CellCensus,
}

pub struct SimulationDriver {
    grid: Grid,
    params: SimulationParameters,
    rng: ChaCha8Rng,
    running: bool,
    tick_count: u64,
    unhappy_count: usize,
    run_id: RunId,
}

impl SimulationDriver {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.parameters.validate()?;
        let mut rng = rng_for(&config);
        let grid = Grid::generate(&config.parameters, &mut rng)?;
        Ok(Self::assemble(config, grid, rng))
    }

    /// Start from a prepared grid instead of a generated one. The next
    /// reset regenerates from the parameters as usual.
    pub fn with_grid(config: SimulationConfig, grid: Grid) -> Result<Self> {
        config.parameters.validate()?;
        if grid.width() != config.parameters.width {
            return Err(Error::invalid_parameter(
                "width",
                grid.width() as f64,
                "grid width differs from configured width",
            ));
        }
        let rng = rng_for(&config);
        Ok(Self::assemble(config, grid, rng))
    }

    fn assemble(config: SimulationConfig, grid: Grid, rng: ChaCha8Rng) -> Self {
        let driver = Self {
            grid,
            params: config.parameters,
            rng,
            running: false,
            tick_count: 0,
            unhappy_count: 0,
            run_id: RunId::new(),
        };
        driver.log_census();
        driver
    }

    pub fn start(&mut self) {
        if !self.running {
            debug!(run_id = %self.run_id, tick = self.tick_count, "Simulation started");
        }
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            debug!(run_id = %self.run_id, tick = self.tick_count, "Simulation stopped");
        }
        self.running = false;
    }

    /// Stop, regenerate the grid from the current parameters and zero the counters
    #[instrument(skip(self), fields(width = self.params.width))]
    pub fn reset(&mut self) -> Result<()> {
        self.stop();
        self.grid = Grid::generate(&self.params, &mut self.rng)?;
        self.tick_count = 0;
        self.unhappy_count = 0;
        self.run_id = RunId::new();
        self.log_census();
        Ok(())
    }

    /// Run one tick if the driver is running.
    ///
    /// A tick that changes nothing stops the driver and leaves the tick count
    /// untouched. A failed tick also stops the driver and keeps the old grid.
    pub fn step(&mut self) -> Result<StepOutcome> {
        if !self.running {
            return Ok(StepOutcome::Idle);
        }

        let engine = TickEngine::from_parameters(&self.params)?;
        let result = match engine.step(&self.grid, &mut self.rng) {
            Ok(result) => result,
            Err(e) => {
                warn!(run_id = %self.run_id, tick = self.tick_count, error = %e, "Tick failed");
                self.running = false;
                return Err(e);
            }
        };

        if result.is_equilibrium(&self.grid) {
            self.running = false;
            info!(
                event = "equilibrium",
                run_id = %self.run_id,
                ticks = self.tick_count,
                "Simulation reached equilibrium"
            );
            return Ok(StepOutcome::Equilibrium);
        }

        self.grid = result.grid;
        self.tick_count += 1;
        self.unhappy_count = result.unhappy_count;

        debug!(
            run_id = %self.run_id,
            tick = self.tick_count,
            unhappy_count = result.unhappy_count,
            relocations = result.relocations,
            "Tick complete"
        );

        Ok(StepOutcome::Advanced {
            unhappy_count: result.unhappy_count,
        })
    }

    /// Start and tick until equilibrium, a stop, or `max_ticks` ticks
    #[instrument(skip(self), fields(run_id = %self.run_id))]
    pub fn run_until_settled(&mut self, max_ticks: u64) -> Result<RunSummary> {
        self.start();
        let mut settled = false;

        for _ in 0..max_ticks {
            match self.step()? {
                StepOutcome::Advanced { .. } => {}
                StepOutcome::Equilibrium => {
                    settled = true;
                    break;
                }
                StepOutcome::Idle => break,
            }
        }
        self.stop();

        let summary = RunSummary {
            run_id: self.run_id,
            ticks: self.tick_count,
            settled,
            final_unhappy: self.unhappy_count,
            census: self.census(),
        };

        info!(
            event = "run_summary",
            run_id = %summary.run_id,
            ticks = summary.ticks,
            settled = summary.settled,
            final_unhappy = summary.final_unhappy,
            unhappy_percent = format!("{:.1}%", self.unhappy_percent()),
            "Run finished"
        );

        Ok(summary)
    }

    /// Tolerance applies from the next tick on; the grid is kept
    pub fn set_tolerance(&mut self, value: f64) -> Result<()> {
        self.set_parameter(Parameter::Tolerance, value)
    }

    pub fn set_empty_ratio(&mut self, value: f64) -> Result<()> {
        self.set_parameter(Parameter::EmptyRatio, value)
    }

    pub fn set_kind_a_ratio(&mut self, value: f64) -> Result<()> {
        self.set_parameter(Parameter::KindARatio, value)
    }

    /// Validate and apply a parameter. Ratio changes stop the run and regenerate the grid.
    pub fn set_parameter(&mut self, parameter: Parameter, value: f64) -> Result<()> {
        if let Err(e) = self.params.set(parameter, value) {
            warn!(parameter = %parameter, value, "Rejected parameter change");
            return Err(e);
        }
        debug!(parameter = %parameter, value, "Parameter changed");

        if parameter.requires_reset() {
            self.reset()?;
        }
        Ok(())
    }

    /// Switch the border rule; applies from the next tick on
    pub fn set_boundary_policy(&mut self, boundary: BoundaryPolicy) {
        self.params.boundary = boundary;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn slot(&self, index: usize) -> Option<Slot> {
        self.grid.get(index)
    }

    pub fn kind_at(&self, index: usize) -> Option<Kind> {
        self.grid.kind_at(index)
    }

    pub fn parameters(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn unhappy_count(&self) -> usize {
        self.unhappy_count
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn census(&self) -> CellCensus {
        self.grid.census()
    }

    pub fn unhappy_percent(&self) -> f64 {
        self.census().unhappy_percent(self.unhappy_count)
    }

    fn log_census(&self) {
        let census = self.census();
        info!(
            event = "grid_generated",
            run_id = %self.run_id,
            total = census.total,
            kind_a = census.kind_a,
            kind_b = census.kind_b,
            empty = census.empty,
            "Generated initial grid"
        );
        if census.empty == 0 && census.occupied() > 0 {
            warn!(
                run_id = %self.run_id,
                "Grid has no empty cells; any unhappy agent will fail the tick"
            );
        }
    }
}

fn rng_for(config: &SimulationConfig) -> ChaCha8Rng {
    match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

impl std::fmt::Debug for SimulationDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationDriver")
            .field("run_id", &self.run_id)
            .field("params", &self.params)
            .field("running", &self.running)
            .field("tick_count", &self.tick_count)
            .field("unhappy_count", &self.unhappy_count)
            .finish()
    }
}
