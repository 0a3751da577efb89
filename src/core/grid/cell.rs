//! Logical grid cell types

use std::ops::Range;

use crate::document::{Cell, CellKind, RowSection};

/// Index of a cell in a grid's cell arena
///
/// Ids are only meaningful for the grid that produced them. Cells are kept in
/// reading order, so ids also order cells top-to-bottom, left-to-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub(crate) usize);

impl CellId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// What a logical grid position holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The cell's top-left position
    Anchor(CellId),
    /// Any other position covered by the cell
    Spanned(CellId),
}

impl Slot {
    pub fn id(&self) -> CellId {
        match self {
            Slot::Anchor(id) | Slot::Spanned(id) => *id,
        }
    }

    pub fn is_anchor(&self) -> bool {
        matches!(self, Slot::Anchor(_))
    }
}

/// Direction of a structural operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Row,
    Column,
}

impl Axis {
    pub fn cross(self) -> Axis {
        match self {
            Axis::Row => Axis::Column,
            Axis::Column => Axis::Row,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::Row => "row",
            Axis::Column => "column",
        }
    }
}

/// Inclusive bounding box in grid coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub min_row: usize,
    pub max_row: usize,
    pub min_col: usize,
    pub max_col: usize,
}

impl Bounds {
    /// Box spanning two corner positions, in any order
    pub fn new(a: (usize, usize), b: (usize, usize)) -> Self {
        Self {
            min_row: a.0.min(b.0),
            max_row: a.0.max(b.0),
            min_col: a.1.min(b.1),
            max_col: a.1.max(b.1),
        }
    }

    pub fn single(row: usize, col: usize) -> Self {
        Self::new((row, col), (row, col))
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.min_row && row <= self.max_row && col >= self.min_col && col <= self.max_col
    }

    pub fn contains_bounds(&self, other: &Bounds) -> bool {
        self.contains(other.min_row, other.min_col) && self.contains(other.max_row, other.max_col)
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_row <= other.max_row
            && other.min_row <= self.max_row
            && self.min_col <= other.max_col
            && other.min_col <= self.max_col
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_row: self.min_row.min(other.min_row),
            max_row: self.max_row.max(other.max_row),
            min_col: self.min_col.min(other.min_col),
            max_col: self.max_col.max(other.max_col),
        }
    }

    pub fn height(&self) -> usize {
        self.max_row - self.min_row + 1
    }

    pub fn width(&self) -> usize {
        self.max_col - self.min_col + 1
    }

    pub fn area(&self) -> usize {
        self.height() * self.width()
    }

    pub fn rows(&self) -> Range<usize> {
        self.min_row..self.max_row + 1
    }

    pub fn cols(&self) -> Range<usize> {
        self.min_col..self.max_col + 1
    }

    /// Half-open index range along an axis
    pub fn range(&self, axis: Axis) -> Range<usize> {
        match axis {
            Axis::Row => self.rows(),
            Axis::Column => self.cols(),
        }
    }

    /// All positions in reading order
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> {
        let cols = self.cols();
        self.rows()
            .flat_map(move |r| cols.clone().map(move |c| (r, c)))
    }
}

/// A cell placed in the logical grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    /// Anchor row
    pub row: usize,
    /// Anchor column
    pub col: usize,
    /// The physical cell, spans resolved
    pub data: Cell,
}

impl GridCell {
    pub fn new(row: usize, col: usize, data: Cell) -> Self {
        GridCell { row, col, data }
    }

    /// An empty unit data cell
    pub fn blank(row: usize, col: usize) -> Self {
        GridCell::new(row, col, Cell::empty())
    }

    pub fn rowspan(&self) -> usize {
        self.data.rowspan
    }

    pub fn colspan(&self) -> usize {
        self.data.colspan
    }

    pub fn is_header(&self) -> bool {
        self.data.kind.is_header()
    }

    pub fn kind(&self) -> CellKind {
        self.data.kind
    }

    pub fn is_unit(&self) -> bool {
        self.data.rowspan == 1 && self.data.colspan == 1
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            min_row: self.row,
            max_row: self.row + self.data.rowspan - 1,
            min_col: self.col,
            max_col: self.col + self.data.colspan - 1,
        }
    }

    pub fn start(&self, axis: Axis) -> usize {
        match axis {
            Axis::Row => self.row,
            Axis::Column => self.col,
        }
    }

    pub fn span(&self, axis: Axis) -> usize {
        match axis {
            Axis::Row => self.data.rowspan,
            Axis::Column => self.data.colspan,
        }
    }

    /// One past the last index covered along an axis
    pub fn end(&self, axis: Axis) -> usize {
        self.start(axis) + self.span(axis)
    }

    pub fn set_start(&mut self, axis: Axis, value: usize) {
        match axis {
            Axis::Row => self.row = value,
            Axis::Column => self.col = value,
        }
    }

    pub fn set_span(&mut self, axis: Axis, value: usize) {
        match axis {
            Axis::Row => self.data.rowspan = value,
            Axis::Column => self.data.colspan = value,
        }
    }

    /// Whether the cell covers both `index - 1` and `index` along an axis
    pub fn straddles(&self, axis: Axis, index: usize) -> bool {
        index > 0 && self.start(axis) < index && self.end(axis) > index
    }
}

/// Per-row attributes of the logical grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowMeta {
    pub section: RowSection,
    pub has_bottom_border: bool,
}

impl RowMeta {
    pub fn in_section(section: RowSection) -> Self {
        RowMeta {
            section,
            has_bottom_border: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_union() {
        let a = Bounds::new((2, 3), (0, 1));
        assert_eq!((a.min_row, a.max_row, a.min_col, a.max_col), (0, 2, 1, 3));
        let b = a.union(&Bounds::single(4, 0));
        assert_eq!(b.height(), 5);
        assert_eq!(b.width(), 4);
        assert_eq!(b.positions().count(), 20);
    }

    #[test]
    fn test_straddles() {
        let cell = GridCell::new(1, 0, Cell::with_span("A", 1, 3));
        assert!(!cell.straddles(Axis::Row, 1));
        assert!(cell.straddles(Axis::Row, 2));
        assert!(cell.straddles(Axis::Row, 3));
        assert!(!cell.straddles(Axis::Row, 4));
        assert!(!cell.straddles(Axis::Column, 1));
    }
}
