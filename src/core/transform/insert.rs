//! Row and column insertion

use log::trace;

use super::{first_on_line, open_lines, position, Outcome, Placement};
use crate::core::grid::{Axis, Grid, GridCell, RowMeta};
use crate::core::target::Target;
use crate::utils::error::{TableError, TableResult};

/// Insert as many rows or columns as the target covers, before or after it
///
/// New lines copy the structure of the adjacent line: a span straddling the
/// insertion point grows, every other position gets an empty cell of the
/// template cell's kind and cross-axis span.
pub fn insert(
    grid: &Grid,
    target: &Target,
    axis: Axis,
    placement: Placement,
) -> TableResult<Outcome> {
    let range = target.range(grid, axis);
    let count = range.len();
    let (index, template) = match placement {
        Placement::Before => (range.start, range.start),
        Placement::After => (range.end, range.end - 1),
    };
    let cross = axis.cross();

    let mut fresh = Vec::new();
    let mut at = 0;
    while at < grid.extent(cross) {
        let (row, col) = position(axis, template, at);
        let id = grid.anchor_at(row, col).ok_or_else(|| {
            TableError::inconsistent(format!("no cell covers ({}, {})", row, col))
        })?;
        let cell = grid.cell(id);
        let span = cell.end(cross) - at;
        if !cell.straddles(axis, index) {
            for k in 0..count {
                let (r, c) = position(axis, index + k, at);
                let mut new_cell = GridCell::new(r, c, cell.data.blank_like());
                new_cell.set_span(cross, span);
                fresh.push(new_cell);
            }
        }
        at += span;
    }
    trace!(
        "inserting {} {}(s) at {} with {} new cell(s)",
        count,
        axis.name(),
        index,
        fresh.len()
    );

    let mut parts = grid.to_parts();
    open_lines(&mut parts.cells, axis, index, count);
    parts.cells.extend(fresh);
    match axis {
        Axis::Row => {
            let meta = RowMeta::in_section(parts.rows[template].section);
            parts
                .rows
                .splice(index..index, std::iter::repeat(meta).take(count));
        }
        Axis::Column => {
            let spec = parts.columns[template].clone();
            parts
                .columns
                .splice(index..index, std::iter::repeat(spec).take(count));
        }
    }

    let grid = parts.assemble()?;
    let (row, col) = position(axis, index, 0);
    let cursor = first_on_line(&grid, axis, index)
        .or_else(|| grid.anchor_at(row, col))
        .ok_or_else(|| TableError::inconsistent("inserted lines hold no cell"))?;
    Ok(Outcome::new(grid, cursor))
}
