//! Neighbor sampling on the flat grid.

use crate::grid::Grid;
use schelling_core::{BoundaryPolicy, Slot};

/// Candidate offsets as `(column delta, row delta)`, in the order
/// left, right, bottom-left, bottom, bottom-right, top-left, top, top-right.
const OFFSETS: [(isize, isize); 8] = [
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Indices of the up to eight neighbors of `index`.
///
/// Under `IndexClip` the flat index `index + dy * width + dx` is kept whenever
/// it lies inside the grid, so edge cells borrow cells from the adjacent row.
/// `RowAware` additionally drops candidates that crossed a row boundary.
pub fn neighbor_indices(index: usize, width: usize, len: usize, policy: BoundaryPolicy) -> Vec<usize> {
    let column = (index % width.max(1)) as isize;
    let w = width as isize;

    OFFSETS
        .iter()
        .filter_map(|&(dx, dy)| {
            let candidate = (index as isize).checked_add(dy * w + dx)?;
            if candidate < 0 || candidate as usize >= len {
                return None;
            }
            if policy == BoundaryPolicy::RowAware {
                let target_column = column + dx;
                if target_column < 0 || target_column >= w {
                    return None;
                }
            }
            Some(candidate as usize)
        })
        .collect()
}

/// Neighbor slot values of `index`, in the fixed enumeration order
pub fn neighbors(grid: &Grid, index: usize, policy: BoundaryPolicy) -> Vec<Slot> {
    neighbor_indices(index, grid.width(), grid.len(), policy)
        .into_iter()
        .map(|i| grid.slots()[i])
        .collect()
}
