//! Square grid of agent slots, stored row-major in a flat vector.

use rand::Rng;
use schelling_core::{area, CellCensus, Error, Kind, Result, SimulationParameters, Slot};
use serde::Serialize;

/// A `width × width` grid. Index `row * width + col`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grid {
    width: usize,
    slots: Vec<Slot>,
}

impl Grid {
    /// An all-empty grid
    pub fn empty(width: usize) -> Result<Self> {
        let size = area(width)?;
        Ok(Self {
            width,
            slots: vec![Slot::Empty; size],
        })
    }

    /// Wrap an explicit slot vector; its length must be `width²`
    pub fn from_slots(width: usize, slots: Vec<Slot>) -> Result<Self> {
        let size = area(width)?;
        if slots.len() != size {
            return Err(Error::invalid_parameter(
                "slots",
                slots.len() as f64,
                "slot count must equal width squared",
            ));
        }
        Ok(Self { width, slots })
    }

    /// Populate a fresh grid by rolling each cell independently.
    ///
    /// A roll `x` in `[0, 1)` gives Empty when `x <= empty_ratio`, kind A up to
    /// `empty_ratio + (1 - empty_ratio) * kind_a_ratio`, kind B above that.
    /// Counts therefore scatter around the target ratios rather than hitting
    /// them exactly.
    pub fn generate<R: Rng + ?Sized>(params: &SimulationParameters, rng: &mut R) -> Result<Self> {
        params.validate()?;
        let size = params.area()?;
        let a_threshold = params.kind_a_threshold();

        let slots = (0..size)
            .map(|_| {
                let roll = rng.gen::<f64>();
                if roll <= params.empty_ratio {
                    Slot::Empty
                } else if roll <= a_threshold {
                    Slot::Occupied(Kind::A)
                } else {
                    Slot::Occupied(Kind::B)
                }
            })
            .collect();

        Ok(Self {
            width: params.width,
            slots,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<Slot> {
        self.slots.get(index).copied()
    }

    pub fn kind_at(&self, index: usize) -> Option<Kind> {
        self.get(index).and_then(|slot| slot.kind())
    }

    /// Exchange two slots. Both indices must be in range.
    pub fn swap(&mut self, a: usize, b: usize) {
        self.slots.swap(a, b);
    }

    /// Ascending indices of every empty slot
    pub fn empty_indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn census(&self) -> CellCensus {
        CellCensus::from_slots(&self.slots)
    }

    /// Iterator over occupied slots with their indices
    pub fn occupied(&self) -> impl Iterator<Item = (usize, Kind)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.kind().map(|kind| (i, kind)))
    }
}

/// Slot-wise equality, used to detect equilibrium
pub fn grid_equals(a: &Grid, b: &Grid) -> bool {
    a == b
}
