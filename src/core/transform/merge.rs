//! Merging and splitting cells

use fxhash::FxHashSet;
use log::trace;

use super::Outcome;
use crate::core::grid::{Grid, GridCell};
use crate::core::target::Target;
use crate::utils::error::{TableError, TableResult};

/// Merge the target block into its top-left cell
///
/// The selected cells must tile the target's bounding box exactly. Their
/// non-empty contents are joined in reading order with `separator`.
pub fn merge(grid: &Grid, target: &Target, separator: &str) -> TableResult<Outcome> {
    let bounds = target.bounds(grid);
    let mut selected = target.cells(grid);
    selected.sort();
    selected.dedup();

    let covered: usize = selected.iter().map(|&id| grid.cell(id).bounds().area()).sum();
    let inside = selected
        .iter()
        .all(|&id| bounds.contains_bounds(&grid.cell(id).bounds()));
    if !inside || covered != bounds.area() {
        return Err(TableError::irregular(format!(
            "{} selected cell(s) do not fill the {}x{} block at ({}, {})",
            selected.len(),
            bounds.height(),
            bounds.width(),
            bounds.min_row,
            bounds.min_col
        )));
    }
    let Some(&keep) = selected.first() else {
        return Err(TableError::irregular("nothing selected"));
    };
    if selected.len() == 1 {
        trace!("merge of a single cell is a no-op");
        return Ok(Outcome::unchanged(grid, keep));
    }

    let content = selected
        .iter()
        .map(|&id| grid.cell(id).data.content.as_str())
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join(separator);
    let dropped: FxHashSet<usize> = selected[1..].iter().map(|id| id.index()).collect();

    let mut parts = grid.to_parts();
    let mut kept = parts.cells[keep.index()].clone();
    kept.data.content = content;
    kept.data.rowspan = bounds.height();
    kept.data.colspan = bounds.width();
    parts.cells[keep.index()] = kept;
    parts.cells = parts
        .cells
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !dropped.contains(i))
        .map(|(_, cell)| cell)
        .collect();
    trace!("merged {} cells into ({}, {})", selected.len(), bounds.min_row, bounds.min_col);

    let grid = parts.assemble()?;
    let cursor = grid
        .anchor_at(bounds.min_row, bounds.min_col)
        .ok_or_else(|| TableError::inconsistent("merged cell vanished"))?;
    Ok(Outcome::new(grid, cursor))
}

/// Split every spanning cell of the target back into unit cells
///
/// The top-left unit keeps the content, alignment and styles; the rest are
/// empty cells of the same kind.
pub fn split(grid: &Grid, target: &Target) -> TableResult<Outcome> {
    let spanning: FxHashSet<usize> = target
        .cells(grid)
        .into_iter()
        .filter(|&id| !grid.cell(id).is_unit())
        .map(|id| id.index())
        .collect();
    let origin = grid.cell(target.origin());
    let (row, col) = (origin.row, origin.col);
    if spanning.is_empty() {
        return Ok(Outcome::unchanged(grid, target.origin()));
    }

    let mut parts = grid.to_parts();
    let mut cells = Vec::with_capacity(parts.cells.len());
    for (i, cell) in parts.cells.drain(..).enumerate() {
        if !spanning.contains(&i) {
            cells.push(cell);
            continue;
        }
        let blank = cell.data.blank_like();
        for (r, c) in cell.bounds().positions() {
            if (r, c) == (cell.row, cell.col) {
                let mut data = cell.data.clone();
                data.rowspan = 1;
                data.colspan = 1;
                cells.push(GridCell::new(r, c, data));
            } else {
                cells.push(GridCell::new(r, c, blank.clone()));
            }
        }
    }
    parts.cells = cells;
    trace!("split {} cell(s)", spanning.len());

    let grid = parts.assemble()?;
    let cursor = grid
        .anchor_at(row, col)
        .ok_or_else(|| TableError::inconsistent("split left no cell at the origin"))?;
    Ok(Outcome::new(grid, cursor))
}
