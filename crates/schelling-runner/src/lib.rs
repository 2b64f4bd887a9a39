//! Cooperative scheduler for the segregation engine.
//!
//! [`SimulationRunner`] advances a [`schelling_world::SimulationDriver`] one
//! tick at a time on a tokio task, waiting a fixed delay after each tick.

pub mod runner;
pub mod telemetry;

pub use runner::{RunnerStatus, SimulationRunner};
