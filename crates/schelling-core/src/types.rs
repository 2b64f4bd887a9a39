//! Core type definitions for the simulation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier minted on every reset so log events from separate runs can be told apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two agent populations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    A,
    B,
}

/// A single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Slot {
    #[default]
    Empty,
    Occupied(Kind),
}

impl Slot {
    pub fn kind(&self) -> Option<Kind> {
        match self {
            Slot::Empty => None,
            Slot::Occupied(kind) => Some(*kind),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }
}

/// How neighbor candidates at the grid border are filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Drop only candidates whose flat index falls outside the grid.
    ///
    /// Cells on the left and right edges pick up neighbors from the adjacent
    /// row (a left-edge cell's "left" is the right-edge cell one row up).
    #[default]
    IndexClip,
    /// Also drop candidates more than one column away, so rows never wrap.
    RowAware,
}

/// Run parameters that a caller may change through the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Tolerance,
    EmptyRatio,
    KindARatio,
}

impl Parameter {
    pub fn name(&self) -> &'static str {
        match self {
            Parameter::Tolerance => "tolerance",
            Parameter::EmptyRatio => "empty_ratio",
            Parameter::KindARatio => "kind_a_ratio",
        }
    }

    /// Changing this parameter invalidates the current grid
    pub fn requires_reset(&self) -> bool {
        !matches!(self, Parameter::Tolerance)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters for one simulation run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Highest tolerated fraction of differing neighbors (0.0 to 1.0)
    pub tolerance: f64,
    /// Probability that a generated cell is empty (0.0 to 1.0)
    pub empty_ratio: f64,
    /// Fraction of occupied cells that hold kind A (0.0 to 1.0)
    pub kind_a_ratio: f64,
    /// Cells per row; the grid is square
    pub width: usize,
    #[serde(default)]
    pub boundary: BoundaryPolicy,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            tolerance: 0.7,
            empty_ratio: 0.1,
            kind_a_ratio: 0.2,
            width: 50,
            boundary: BoundaryPolicy::IndexClip,
        }
    }
}

impl SimulationParameters {
    pub fn validate(&self) -> Result<()> {
        validate_ratio(Parameter::Tolerance, self.tolerance)?;
        validate_ratio(Parameter::EmptyRatio, self.empty_ratio)?;
        validate_ratio(Parameter::KindARatio, self.kind_a_ratio)?;
        area(self.width)?;
        Ok(())
    }

    /// Number of cells in the grid
    pub fn area(&self) -> Result<usize> {
        area(self.width)
    }

    /// Upper bound of the roll range that produces kind A
    pub fn kind_a_threshold(&self) -> f64 {
        self.empty_ratio + (1.0 - self.empty_ratio) * self.kind_a_ratio
    }

    pub fn get(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Tolerance => self.tolerance,
            Parameter::EmptyRatio => self.empty_ratio,
            Parameter::KindARatio => self.kind_a_ratio,
        }
    }

    /// Validate `value` and store it. On error nothing changes.
    pub fn set(&mut self, parameter: Parameter, value: f64) -> Result<()> {
        validate_ratio(parameter, value)?;
        match parameter {
            Parameter::Tolerance => self.tolerance = value,
            Parameter::EmptyRatio => self.empty_ratio = value,
            Parameter::KindARatio => self.kind_a_ratio = value,
        }
        Ok(())
    }
}

/// Reject anything outside `[0, 1]`, NaN included.
pub fn validate_ratio(parameter: Parameter, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid_parameter(
            parameter.name(),
            value,
            "must be within [0, 1]",
        ))
    }
}

/// `width²`, rejecting zero and overflow
pub fn area(width: usize) -> Result<usize> {
    if width == 0 {
        return Err(Error::invalid_parameter(
            "width",
            width as f64,
            "must be positive",
        ));
    }
    width
        .checked_mul(width)
        .ok_or_else(|| Error::invalid_parameter("width", width as f64, "grid area overflows"))
}
