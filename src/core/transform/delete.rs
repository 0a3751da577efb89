//! Row and column deletion

use log::trace;

use super::{cursor_near, position, Outcome};
use crate::core::grid::{Axis, Grid};
use crate::core::target::Target;
use crate::utils::error::{TableError, TableResult};

/// Delete every row or column the target covers
///
/// Cells entirely inside the range disappear. Cells reaching out of it
/// shrink; one anchored inside moves to the first surviving line.
pub fn delete(grid: &Grid, target: &Target, axis: Axis) -> TableResult<Outcome> {
    let range = target.range(grid, axis);
    if range.start == 0 && range.end >= grid.extent(axis) {
        return Err(TableError::GridEmptied { axis: axis.name() });
    }
    let removed = range.len();

    let mut parts = grid.to_parts();
    parts.cells.retain_mut(|cell| {
        let start = cell.start(axis);
        let end = cell.end(axis);
        let overlap = end.min(range.end).saturating_sub(start.max(range.start));
        if overlap == cell.span(axis) {
            return false;
        }
        cell.set_span(axis, cell.span(axis) - overlap);
        if start >= range.end {
            cell.set_start(axis, start - removed);
        } else if start >= range.start {
            cell.set_start(axis, range.start);
        }
        true
    });
    match axis {
        Axis::Row => {
            parts.rows.drain(range.clone());
        }
        Axis::Column => {
            parts.columns.drain(range.clone());
        }
    }
    trace!("deleted {}s {:?}", axis.name(), range);

    let origin = grid.cell(target.origin());
    let along = range.start.saturating_sub(1);
    let (row, col) = position(axis, along, origin.start(axis.cross()));
    let grid = parts.assemble()?;
    let cursor = cursor_near(&grid, row, col)
        .ok_or_else(|| TableError::inconsistent("no cell left after delete"))?;
    Ok(Outcome::new(grid, cursor))
}
