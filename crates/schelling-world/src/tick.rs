//! One simulation step: evaluate every agent and relocate the unhappy ones.

use crate::grid::{grid_equals, Grid};
use crate::happiness;
use crate::neighbors::neighbors;
use rand::Rng;
use schelling_core::{
    validate_ratio, BoundaryPolicy, Error, Parameter, Result, SimulationParameters,
};
use tracing::trace;

/// Grid produced by a tick, with how many agents were unhappy in it
#[derive(Debug, Clone, PartialEq)]
pub struct TickResult {
    pub grid: Grid,
    pub unhappy_count: usize,
    pub relocations: usize,
}

impl TickResult {
    /// True when nothing moved relative to `before`
    pub fn is_equilibrium(&self, before: &Grid) -> bool {
        grid_equals(&self.grid, before)
    }
}

/// Tick rules for a fixed tolerance and boundary policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickEngine {
    tolerance: f64,
    boundary: BoundaryPolicy,
}

impl TickEngine {
    pub fn new(tolerance: f64) -> Result<Self> {
        validate_ratio(Parameter::Tolerance, tolerance)?;
        Ok(Self {
            tolerance,
            boundary: BoundaryPolicy::default(),
        })
    }

    pub fn from_parameters(params: &SimulationParameters) -> Result<Self> {
        Ok(Self::new(params.tolerance)?.with_boundary(params.boundary))
    }

    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn boundary(&self) -> BoundaryPolicy {
        self.boundary
    }

    /// Run one tick over `grid` and return the replacement grid.
    ///
    /// Agents are visited in ascending index order. Happiness is always judged
    /// against the grid as it was at the start of the tick, but relocation
    /// targets come from the empty slots of the grid being built, so a cell
    /// vacated earlier in the tick can be claimed by a later mover.
    pub fn step<R: Rng + ?Sized>(&self, grid: &Grid, rng: &mut R) -> Result<TickResult> {
        let mut next = grid.clone();
        let mut vacant = next.empty_indices();
        let mut unhappy_count = 0;
        let mut relocations = 0;

        for (index, kind) in grid.occupied() {
            let around = neighbors(grid, index, self.boundary);
            if !happiness::is_unhappy(kind, &around, self.tolerance) {
                continue;
            }
            unhappy_count += 1;

            if vacant.is_empty() {
                return Err(Error::NoEmptySlotAvailable { index });
            }
            let target = vacant.remove(rng.gen_range(0..vacant.len()));
            next.swap(index, target);
            if let Err(pos) = vacant.binary_search(&index) {
                vacant.insert(pos, index);
            }
            relocations += 1;

            trace!(from = index, to = target, kind = ?kind, "Relocated unhappy agent");
        }

        Ok(TickResult {
            grid: next,
            unhappy_count,
            relocations,
        })
    }
}

/// Run one tick with the default boundary policy. The grid carries its own width.
pub fn tick<R: Rng + ?Sized>(grid: &Grid, tolerance: f64, rng: &mut R) -> Result<TickResult> {
    TickEngine::new(tolerance)?.step(grid, rng)
}
