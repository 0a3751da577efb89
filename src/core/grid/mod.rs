//! Logical Table Grid
//!
//! Reconciles the sparse physical structure of a table (rows holding only
//! the cells that start in them) with a dense, rectangular logical grid.
//!
//! # Architecture
//!
//! ```text
//! Physical rows -> Builder (placement + repair) -> Grid (arena + slots) -> Physical rows
//! ```
//!
//! Each logical position holds a [`Slot`]: the anchor of a cell, or a
//! back-reference to the cell spanning over it. Cells are stored once, in an
//! arena indexed by [`CellId`].
//!
//! # Example
//!
//! ```
//! use tablecraft::core::grid::{Grid, Slot};
//! use tablecraft::document::{Cell, Row, Table};
//!
//! let mut table = Table::new(2);
//! table.push_row(Row::with_cells(vec![Cell::with_span("A", 1, 2), Cell::new("B")]));
//! table.push_row(Row::with_cells(vec![Cell::new("C")]));
//!
//! let grid = Grid::build(&table);
//! assert_eq!((grid.height(), grid.width()), (2, 2));
//! assert!(matches!(grid.slot(1, 0), Some(Slot::Spanned(_))));
//! assert_eq!(grid.cell(grid.anchor_at(1, 1).unwrap()).data.content, "C");
//! ```

mod cell;
mod model;


// Re-export public API
pub use cell::{Axis, Bounds, CellId, GridCell, RowMeta, Slot};
pub use model::{Grid, GridParts};
