//! Turn host selections into structural targets

use std::ops::Range;

use log::trace;

use super::selection::{Selection, SelectionRange};
use crate::core::clipboard::Fragment;
use crate::core::grid::{Axis, Bounds, CellId, Grid};
use crate::document::CellAddress;
use crate::utils::error::{TableError, TableResult};

/// Which side of the target a new line goes on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

/// Shape of target a command wants from a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// The start cell, or a block when several cells are selected
    Cell,
    Rows,
    Columns,
    /// Always a block, even for a single cell
    Block,
}

impl TargetKind {
    pub fn for_axis(axis: Axis) -> Self {
        match axis {
            Axis::Row => TargetKind::Rows,
            Axis::Column => TargetKind::Columns,
        }
    }
}

/// Resolved operand of a transform
///
/// Created per command against one grid; ids are only valid for that grid.
#[derive(Debug, Clone)]
pub enum Target {
    Cell(CellId),
    Rows {
        rows: Range<usize>,
        origin: CellId,
    },
    Columns {
        cols: Range<usize>,
        origin: CellId,
    },
    Block {
        bounds: Bounds,
        /// Cells the host selected; merge checks that they tile `bounds`
        cells: Vec<CellId>,
        origin: CellId,
    },
    Paste(PasteTarget),
}

impl Target {
    /// Cell the selection started in
    pub fn origin(&self) -> CellId {
        match self {
            Target::Cell(id) => *id,
            Target::Rows { origin, .. }
            | Target::Columns { origin, .. }
            | Target::Block { origin, .. } => *origin,
            Target::Paste(paste) => paste.origin,
        }
    }

    /// Bounding box in grid coordinates
    pub fn bounds(&self, grid: &Grid) -> Bounds {
        let last_row = grid.height().saturating_sub(1);
        let last_col = grid.width().saturating_sub(1);
        match self {
            Target::Cell(id) => grid.cell(*id).bounds(),
            Target::Rows { rows, .. } => Bounds::new((rows.start, 0), (rows.end - 1, last_col)),
            Target::Columns { cols, .. } => Bounds::new((0, cols.start), (last_row, cols.end - 1)),
            Target::Block { bounds, .. } => *bounds,
            Target::Paste(paste) => paste.bounds,
        }
    }

    /// Lines covered along an axis
    pub fn range(&self, grid: &Grid, axis: Axis) -> Range<usize> {
        match (self, axis) {
            (Target::Rows { rows, .. }, Axis::Row) => rows.clone(),
            (Target::Columns { cols, .. }, Axis::Column) => cols.clone(),
            _ => self.bounds(grid).range(axis),
        }
    }

    /// Cells the target acts on, in reading order
    pub fn cells(&self, grid: &Grid) -> Vec<CellId> {
        match self {
            Target::Cell(id) => vec![*id],
            Target::Block { cells, .. } => cells.clone(),
            _ => grid.cells_touching(&self.bounds(grid)),
        }
    }
}

/// Where a clipboard fragment lands
#[derive(Debug, Clone)]
pub struct PasteTarget {
    pub origin: CellId,
    /// Target cell's rectangle, grown over straddling spans
    pub bounds: Bounds,
    /// Private copy of the clipboard fragment
    pub fragment: Fragment,
}

impl PasteTarget {
    pub fn axis(&self) -> Axis {
        self.fragment.axis
    }

    /// First line the fragment will occupy
    pub fn insert_index(&self, placement: Placement) -> usize {
        let range = self.bounds.range(self.axis());
        match placement {
            Placement::Before => range.start,
            Placement::After => range.end,
        }
    }

    /// Region the fragment occupies after pasting into a grid of `breadth`
    /// lines across the paste axis
    pub fn extent(&self, placement: Placement, breadth: usize) -> Bounds {
        let start = self.insert_index(placement);
        let end = start + self.fragment.lines() - 1;
        let cross_end = breadth.max(self.fragment.breadth()).saturating_sub(1);
        match self.axis() {
            Axis::Row => Bounds::new((start, 0), (end, cross_end)),
            Axis::Column => Bounds::new((0, start), (cross_end, end)),
        }
    }
}

fn locate(grid: &Grid, address: CellAddress) -> TableResult<CellId> {
    grid.locate(address).ok_or(TableError::NotInTable)
}

/// Target the single cell containing the selection start
pub fn resolve_cell(grid: &Grid, start: CellAddress) -> TableResult<Target> {
    locate(grid, start).map(Target::Cell)
}

/// Target the current selection for a command of the given kind
///
/// A multi-cell selection resolves to the bounding box of every touched
/// position, grown so no spanning cell is split by its edge. A single cell
/// resolves to its own rectangle.
pub fn resolve_menu(
    grid: &Grid,
    start: CellAddress,
    selection: &Selection,
    kind: TargetKind,
) -> TableResult<Target> {
    let origin = locate(grid, start)?;

    let (bounds, mut cells) = match selection {
        Selection::Range { start, end } => {
            let range = SelectionRange::locate(grid, *start, *end)?;
            let bounds = range.bounds(grid);
            (bounds, grid.cells_within(&bounds))
        }
        Selection::Cell(addr) => {
            let id = locate(grid, *addr)?;
            (grid.cell(id).bounds(), vec![id])
        }
        Selection::Cells(addrs) => {
            let mut ids = addrs
                .iter()
                .map(|addr| locate(grid, *addr))
                .collect::<TableResult<Vec<_>>>()?;
            ids.sort();
            ids.dedup();
            let union = ids
                .iter()
                .map(|&id| grid.cell(id).bounds())
                .reduce(|a, b| a.union(&b))
                .unwrap_or_else(|| grid.cell(origin).bounds());
            (grid.expand(union), ids)
        }
    };
    if cells.is_empty() {
        cells.push(origin);
    }
    let single = cells.len() == 1;
    trace!(
        "resolved {:?} target over rows {:?} cols {:?} ({} cell(s))",
        kind,
        bounds.rows(),
        bounds.cols(),
        cells.len()
    );

    let target = match kind {
        TargetKind::Rows => Target::Rows {
            rows: bounds.rows(),
            origin,
        },
        TargetKind::Columns => Target::Columns {
            cols: bounds.cols(),
            origin,
        },
        TargetKind::Cell if single => Target::Cell(cells[0]),
        TargetKind::Cell | TargetKind::Block => Target::Block {
            bounds,
            cells,
            origin,
        },
    };
    Ok(target)
}

/// Anchor a clipboard fragment at the target cell's row or column
pub fn resolve_paste(grid: &Grid, target: CellAddress, fragment: &Fragment) -> TableResult<Target> {
    let origin = locate(grid, target)?;
    let bounds = grid.expand(grid.cell(origin).bounds());
    Ok(Target::Paste(PasteTarget {
        origin,
        bounds,
        fragment: fragment.clone(),
    }))
}
