//! Population counts for a grid.

use crate::types::{Kind, Slot};
use serde::{Deserialize, Serialize};

/// Counts of each slot state in a grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCensus {
    pub total: usize,
    pub empty: usize,
    pub kind_a: usize,
    pub kind_b: usize,
}

impl CellCensus {
    pub fn from_slots<'a>(slots: impl IntoIterator<Item = &'a Slot>) -> Self {
        slots.into_iter().fold(Self::default(), |mut census, slot| {
            census.total += 1;
            match slot {
                Slot::Empty => census.empty += 1,
                Slot::Occupied(Kind::A) => census.kind_a += 1,
                Slot::Occupied(Kind::B) => census.kind_b += 1,
            }
            census
        })
    }

    pub fn occupied(&self) -> usize {
        self.kind_a + self.kind_b
    }

    pub fn count(&self, kind: Kind) -> usize {
        match kind {
            Kind::A => self.kind_a,
            Kind::B => self.kind_b,
        }
    }

    /// Unhappy agents as a percentage of all cells, the figure shown next to the tick counter
    pub fn unhappy_percent(&self, unhappy: usize) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        unhappy as f64 / self.total as f64 * 100.0
    }
}
