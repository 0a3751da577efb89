//! # tablecraft
//!
//! Span-aware table grid editing engine written in Rust.
//!
//! ## Features
//!
//! - **Logical Grid**: Resolves `rowspan`/`colspan` into a rectangular grid over sparse physical rows
//! - **Selection Targeting**: Turns cell, range and cell-set selections into row, column or block targets
//! - **Structural Edits**: Insert, delete, merge, split, cut, copy and paste that keep spans consistent
//! - **Header Roles**: Header cells, head/body/foot rows, header columns
//! - **Table Codecs**: LaTeX `tabular`/`longtable` and Typst `table(...)` reading and writing
//! - **WASM Support**: Compiles to WebAssembly for browser usage
//!
//! ## Usage Examples
//!
//! ### Editing a table
//!
//! ```rust
//! use tablecraft::{Selection, Table, TableCommand, TableEditor, CommandOutcome, CellAddress};
//!
//! let mut table = Table::from_rows([vec!["a", "b"], vec!["c", "d"]]);
//! let mut editor = TableEditor::new();
//!
//! let merge = TableCommand::parse("mergeCells", None).unwrap();
//! let outcome = editor.execute(&mut table, &Selection::range((0, 0), (1, 1)), &merge).unwrap();
//! assert_eq!(outcome, CommandOutcome::Changed { cursor: CellAddress::new(0, 0) });
//! assert_eq!(table.rows[0].cells[0].rowspan, 2);
//! ```
//!
//! ### Converting between formats
//!
//! ```rust
//! use tablecraft::{parse_latex_table, table_to_typst};
//!
//! let table = parse_latex_table(r"
//!     \begin{tabular}{|l|c|}
//!     \multicolumn{2}{c}{Title} \\
//!     a & b \\
//!     \end{tabular}
//! ").unwrap();
//! let typst = table_to_typst(&table);
//! assert!(typst.contains("table.cell(colspan: 2"));
//! ```

/// Core table engine
pub mod core;

/// Physical table model
pub mod document;

/// Feature modules - table formats and styling
pub mod features;

/// Utility modules
pub mod utils;

/// WASM bindings (feature-gated)
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export the engine
pub use core::commands::{
    command_kind, insert_table, CommandKind, CommandOutcome, InsertTableOptions, TableCommand,
    TableEditor,
};
pub use core::grid::{Axis, Grid};
pub use core::options::{DegradedPolicy, EngineOptions, HeaderType};
pub use core::target::Selection;

// Re-export the physical model
pub use document::{
    Alignment, Cell, CellAddress, CellKind, ColSpec, ColWidth, Row, RowSection, StyleMap, Table,
};

// Re-export feature modules
pub use features::latex;
pub use features::styles;
pub use features::typst;
pub use features::{
    detect_format, parse_latex_table, parse_table, parse_typst_table, render_table,
    table_to_latex, table_to_typst, Format,
};

// Re-export utilities
pub use utils::diagnostics;
pub use utils::diagnostics::{check_table, format_diagnostics};
pub use utils::error::{TableError, TableResult};
