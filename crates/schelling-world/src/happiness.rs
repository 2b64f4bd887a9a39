//! Happiness rule: an agent is unhappy when too many neighbors differ from it.

use schelling_core::{Kind, Slot};

/// Outcome of evaluating one agent against its neighborhood
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Happiness {
    /// Occupied neighbors of the other kind
    pub different: usize,
    /// Every in-range neighbor slot, empty ones included
    pub total: usize,
    pub unhappy: bool,
}

impl Happiness {
    /// Fraction of neighbor slots holding the other kind; `None` when isolated
    pub fn different_fraction(&self) -> Option<f64> {
        (self.total > 0).then(|| self.different as f64 / self.total as f64)
    }
}

/// Evaluate `kind` against its neighbor slots.
///
/// The denominator counts empty neighbors as well, so empty space dilutes the
/// share of differing neighbors. A cell with no neighbor slots at all is
/// happy regardless of tolerance.
pub fn evaluate(kind: Kind, neighbors: &[Slot], tolerance: f64) -> Happiness {
    let different = neighbors
        .iter()
        .filter_map(Slot::kind)
        .filter(|&neighbor| neighbor != kind)
        .count();
    let total = neighbors.len();

    let unhappy = if total == 0 {
        false
    } else {
        different as f64 / total as f64 > tolerance
    };

    Happiness {
        different,
        total,
        unhappy,
    }
}

pub fn is_unhappy(kind: Kind, neighbors: &[Slot], tolerance: f64) -> bool {
    evaluate(kind, neighbors, tolerance).unhappy
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Slot = Slot::Occupied(Kind::A);
    const B: Slot = Slot::Occupied(Kind::B);
    const E: Slot = Slot::Empty;

    #[test]
    fn test_isolated_cell_is_never_unhappy() {
        for tolerance in [0.0, 0.25, 0.5, 1.0] {
            let result = evaluate(Kind::A, &[], tolerance);
            assert!(!result.unhappy);
            assert_eq!(result.different_fraction(), None);
        }
    }

    #[test]
    fn test_all_empty_neighbors_is_happy() {
        for tolerance in [0.0, 0.5, 1.0] {
            assert!(!is_unhappy(Kind::B, &[E, E, E], tolerance));
        }
    }

    #[test]
    fn test_threshold_is_strict() {
        // 2 of 4 differ: exactly at 0.5 is tolerated
        let neighbors = [B, B, A, E];
        assert!(!is_unhappy(Kind::A, &neighbors, 0.5));
        assert!(is_unhappy(Kind::A, &neighbors, 0.49));
    }

    #[test]
    fn test_empty_slots_count_toward_total() {
        let result = evaluate(Kind::A, &[B, E, E, E], 0.3);
        assert_eq!(result.different, 1);
        assert_eq!(result.total, 4);
        assert_eq!(result.different_fraction(), Some(0.25));
        assert!(!result.unhappy);
    }

    #[test]
    fn test_zero_tolerance_flags_any_difference() {
        assert!(is_unhappy(Kind::A, &[A, A, A, B], 0.0));
        assert!(!is_unhappy(Kind::A, &[A, A, A, E], 0.0));
    }

    #[test]
    fn test_full_tolerance_accepts_everything() {
        assert!(!is_unhappy(Kind::A, &[B; 8], 1.0));
    }
}
