//! Host selections and their grid-space ranges

use crate::core::grid::{Bounds, CellId, Grid};
use crate::document::CellAddress;
use crate::utils::error::{TableError, TableResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Selection as reported by the host, in physical cell addresses
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Selection {
    /// Caret inside a single cell
    Cell(CellAddress),
    /// Rectangular drag from one cell to another
    Range { start: CellAddress, end: CellAddress },
    /// Explicit set of selected cells; the first one is the start cell
    Cells(Vec<CellAddress>),
}

impl Selection {
    pub fn cell(row: usize, cell: usize) -> Self {
        Selection::Cell(CellAddress::new(row, cell))
    }

    pub fn range(start: (usize, usize), end: (usize, usize)) -> Self {
        Selection::Range {
            start: CellAddress::new(start.0, start.1),
            end: CellAddress::new(end.0, end.1),
        }
    }

    /// Cell where the selection starts
    pub fn start(&self) -> Option<CellAddress> {
        match self {
            Selection::Cell(addr) => Some(*addr),
            Selection::Range { start, .. } => Some(*start),
            Selection::Cells(cells) => cells.first().copied(),
        }
    }

    /// Every address named by the selection
    pub fn addresses(&self) -> Vec<CellAddress> {
        match self {
            Selection::Cell(addr) => vec![*addr],
            Selection::Range { start, end } => vec![*start, *end],
            Selection::Cells(cells) => cells.clone(),
        }
    }
}

/// Rectangular selection between two corner cells of a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    pub start: CellId,
    pub end: CellId,
}

impl SelectionRange {
    pub fn new(start: CellId, end: CellId) -> Self {
        SelectionRange { start, end }
    }

    /// Resolve both corners of a host range selection
    pub fn locate(grid: &Grid, start: CellAddress, end: CellAddress) -> TableResult<Self> {
        let start = grid.locate(start).ok_or(TableError::NotInTable)?;
        let end = grid.locate(end).ok_or(TableError::NotInTable)?;
        Ok(SelectionRange { start, end })
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Bounding box of both corner cells, grown so no cell straddles its edge
    pub fn bounds(&self, grid: &Grid) -> Bounds {
        let corners = grid
            .cell(self.start)
            .bounds()
            .union(&grid.cell(self.end).bounds());
        grid.expand(corners)
    }
}
