//! Structural transforms
//!
//! Every transform is a pure function from a grid and a [`Target`] to a new
//! grid plus the cell the cursor should land on. The input grid is never
//! touched: transforms take it apart with [`Grid::to_parts`], rewrite the
//! cells and reassemble, so a failure leaves nothing half-edited.
//!
//! [`Target`]: crate::core::target::Target

mod copy;
mod delete;
mod header;
mod insert;
mod merge;
mod paste;


use crate::core::grid::{Axis, CellId, Grid, GridCell};

pub use crate::core::target::Placement;
pub use copy::copy;
pub use delete::delete;
pub use header::{set_cell_type, set_col_type, set_row_type, RowType};
pub use insert::insert;
pub use merge::{merge, split};
pub use paste::paste;

/// Result of a successful transform
#[derive(Debug, Clone)]
pub struct Outcome {
    pub grid: Grid,
    /// Cell the host should move the selection into
    pub cursor: CellId,
}

impl Outcome {
    pub fn new(grid: Grid, cursor: CellId) -> Self {
        Outcome { grid, cursor }
    }

    /// The input grid, unchanged
    pub fn unchanged(grid: &Grid, cursor: CellId) -> Self {
        Outcome::new(grid.clone(), cursor)
    }
}

/// Make room for `count` new lines at `index`
///
/// Cells at or past `index` move out of the way, cells straddling it grow.
/// Returns, per cross-axis position, whether a grown cell covers the new lines.
fn open_lines(cells: &mut [GridCell], axis: Axis, index: usize, count: usize) -> Vec<bool> {
    let mut covered = Vec::new();
    let cross = axis.cross();
    for cell in cells.iter_mut() {
        if cell.start(axis) >= index {
            let start = cell.start(axis);
            cell.set_start(axis, start + count);
        } else if cell.straddles(axis, index) {
            let span = cell.span(axis);
            cell.set_span(axis, span + count);
            if covered.len() < cell.end(cross) {
                covered.resize(cell.end(cross), false);
            }
            for flag in &mut covered[cell.start(cross)..cell.end(cross)] {
                *flag = true;
            }
        }
    }
    covered
}

/// First cell anchored on line `index`, in reading order
fn first_on_line(grid: &Grid, axis: Axis, index: usize) -> Option<CellId> {
    grid.ids()
        .filter(|&id| grid.cell(id).start(axis) == index)
        .min_by_key(|&id| grid.cell(id).start(axis.cross()))
}

/// Cell covering a position, clamped into the grid
fn cursor_near(grid: &Grid, row: usize, col: usize) -> Option<CellId> {
    let row = row.min(grid.height().checked_sub(1)?);
    let col = col.min(grid.width().checked_sub(1)?);
    grid.anchor_at(row, col)
}

/// Position along `axis` and across it, as (row, col)
fn position(axis: Axis, along: usize, across: usize) -> (usize, usize) {
    match axis {
        Axis::Row => (along, across),
        Axis::Column => (across, along),
    }
}
