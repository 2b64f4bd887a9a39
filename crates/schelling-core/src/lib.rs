//! Core types and utilities for the Schelling segregation simulation.

pub mod census;
pub mod config;
pub mod error;
pub mod types;

pub use census::*;
pub use config::*;
pub use error::{Error, Result};
pub use types::*;
