//! Row and column clipboard
//!
//! Holds the most recently copied rows or columns as a detached grid. The
//! clipboard keeps at most one fragment; the last copy or cut wins.

use crate::core::grid::{Axis, Grid};

/// A detached slice of a grid, cut along one axis
///
/// The inner grid satisfies every grid invariant on its own. For a row
/// fragment its height is the number of copied rows; for a column fragment
/// its width is the number of copied columns.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub axis: Axis,
    pub grid: Grid,
}

impl Fragment {
    pub fn new(axis: Axis, grid: Grid) -> Self {
        Fragment { axis, grid }
    }

    /// Number of copied lines
    pub fn lines(&self) -> usize {
        self.grid.extent(self.axis)
    }

    /// Length of each copied line
    pub fn breadth(&self) -> usize {
        self.grid.extent(self.axis.cross())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    fragment: Option<Fragment>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rows(&mut self, grid: Grid) {
        self.fragment = Some(Fragment::new(Axis::Row, grid));
    }

    pub fn set_columns(&mut self, grid: Grid) {
        self.fragment = Some(Fragment::new(Axis::Column, grid));
    }

    pub fn set(&mut self, fragment: Fragment) {
        self.fragment = Some(fragment);
    }

    /// Copied rows, if the clipboard holds rows
    pub fn rows(&self) -> Option<&Fragment> {
        self.get(Axis::Row)
    }

    /// Copied columns, if the clipboard holds columns
    pub fn columns(&self) -> Option<&Fragment> {
        self.get(Axis::Column)
    }

    pub fn get(&self, axis: Axis) -> Option<&Fragment> {
        self.fragment.as_ref().filter(|f| f.axis == axis)
    }

    pub fn clear(&mut self) {
        self.fragment = None;
    }

    pub fn is_empty(&self) -> bool {
        self.fragment.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Table;

    #[test]
    fn test_last_writer_wins() {
        let mut clipboard = Clipboard::new();
        assert!(clipboard.is_empty());

        clipboard.set_rows(Grid::build(&Table::from_rows([vec!["a", "b"]])));
        assert_eq!(clipboard.rows().map(|f| f.lines()), Some(1));
        assert!(clipboard.columns().is_none());

        clipboard.set_columns(Grid::build(&Table::from_rows([vec!["x"], vec!["y"]])));
        assert!(clipboard.rows().is_none());
        let columns = clipboard.columns().unwrap();
        assert_eq!((columns.lines(), columns.breadth()), (1, 2));

        clipboard.clear();
        assert!(clipboard.is_empty());
    }
}
