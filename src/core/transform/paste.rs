//! Pasting clipboard fragments

use log::{debug, trace};

use super::{first_on_line, open_lines, position, Outcome, Placement};
use crate::core::grid::{Axis, Grid, RowMeta};
use crate::core::target::PasteTarget;
use crate::utils::error::{TableError, TableResult};

/// Insert the target's fragment before or after the target line
///
/// The narrower of grid and fragment is padded with empty cells. Spans
/// straddling the insertion point grow over the pasted lines, so fragment
/// cells landing under them are clipped, or dropped when nothing is left.
pub fn paste(grid: &Grid, target: &PasteTarget, placement: Placement) -> TableResult<Outcome> {
    let axis = target.axis();
    let cross = axis.cross();
    let index = target.insert_index(placement);
    let count = target.fragment.lines();
    let breadth = grid.extent(cross).max(target.fragment.breadth());
    let fragment = target.fragment.grid.to_parts();

    let mut parts = grid.to_parts();
    match cross {
        Axis::Column => {
            for col in parts.columns.len()..breadth {
                parts.columns.push(fragment.columns[col].clone());
            }
        }
        Axis::Row => {
            for row in parts.rows.len()..breadth {
                parts.rows.push(RowMeta::in_section(fragment.rows[row].section));
            }
        }
    }

    let blocked = open_lines(&mut parts.cells, axis, index, count);
    let is_blocked = |at: usize| blocked.get(at).copied().unwrap_or(false);
    let (mut clipped, mut dropped) = (0, 0);
    for cell in fragment.cells {
        let start = cell.start(cross);
        if is_blocked(start) {
            dropped += 1;
            continue;
        }
        let free = (start..cell.end(cross))
            .take_while(|&at| !is_blocked(at))
            .count();
        let mut placed = cell;
        let along = placed.start(axis);
        placed.set_start(axis, along + index);
        if free < placed.span(cross) {
            clipped += 1;
            placed.set_span(cross, free);
        }
        parts.cells.push(placed);
    }
    if clipped + dropped > 0 {
        debug!(
            "paste under widened spans clipped {} and dropped {} cell(s)",
            clipped, dropped
        );
    }

    match axis {
        Axis::Row => {
            parts.rows.splice(index..index, fragment.rows);
        }
        Axis::Column => {
            parts.columns.splice(index..index, fragment.columns);
        }
    }
    trace!("pasted {} {}(s) at {}", count, axis.name(), index);

    let grid = parts.assemble_filled()?;
    let (row, col) = position(axis, index, 0);
    let cursor = first_on_line(&grid, axis, index)
        .or_else(|| grid.anchor_at(row, col))
        .ok_or_else(|| TableError::inconsistent("pasted lines hold no cell"))?;
    Ok(Outcome::new(grid, cursor))
}
