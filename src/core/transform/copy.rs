//! Row and column extraction

use log::trace;

use crate::core::clipboard::Fragment;
use crate::core::grid::{Axis, Grid, GridParts};
use crate::core::target::Target;
use crate::document::TableFrame;
use crate::utils::error::TableResult;

/// Copy the rows or columns the target covers into a detached fragment
///
/// Cells reaching past the copied range are clipped to it.
pub fn copy(grid: &Grid, target: &Target, axis: Axis) -> TableResult<Fragment> {
    let range = target.range(grid, axis);
    let cells = grid
        .cells()
        .iter()
        .filter(|cell| cell.start(axis) < range.end && cell.end(axis) > range.start)
        .map(|cell| {
            let start = cell.start(axis).max(range.start);
            let end = cell.end(axis).min(range.end);
            let mut clipped = cell.clone();
            clipped.set_start(axis, start - range.start);
            clipped.set_span(axis, end - start);
            clipped
        })
        .collect();

    let source = grid.to_parts();
    let parts = match axis {
        Axis::Row => GridParts {
            rows: source.rows[range.clone()].to_vec(),
            columns: source.columns,
            frame: TableFrame::default(),
            cells,
        },
        Axis::Column => GridParts {
            rows: source.rows,
            columns: source.columns[range.clone()].to_vec(),
            frame: TableFrame::default(),
            cells,
        },
    };
    trace!("copied {}s {:?}", axis.name(), range);
    Ok(Fragment::new(axis, parts.assemble()?))
}
