//! Schelling segregation engine.
//!
//! This crate implements the square grid of agents, neighbor sampling, the
//! happiness rule, the tick function that relocates unhappy agents, and the
//! driver that owns a running simulation.

pub mod driver;
pub mod grid;
pub mod happiness;
pub mod neighbors;
pub mod tick;

pub use driver::{RunSummary, SimulationDriver, StepOutcome};
pub use grid::{grid_equals, Grid};
pub use happiness::Happiness;
pub use tick::{tick, TickEngine, TickResult};
