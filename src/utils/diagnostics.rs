//! Table structure diagnostics
//!
//! Building a grid from hand-edited markup can require recovery: spans that
//! run off the table are clamped, overlapping spans are narrowed and short
//! rows are padded. Each recovery is recorded as a [`Diagnostic`] so callers
//! can report it or refuse destructive edits on a degraded grid.
//!
//! ## Example
//!
//! ```rust
//! use tablecraft::diagnostics::check_table;
//! use tablecraft::document::{Cell, Row, Table};
//!
//! let mut table = Table::new(2);
//! table.push_row(Row::with_cells(vec![Cell::with_span("A", 1, 5), Cell::new("B")]));
//! let result = check_table(&table);
//! assert!(result.warnings > 0);
//! ```

use std::fmt;

use crate::core::grid::Grid;
use crate::document::Table;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    /// Informational note
    Info,
    /// Warning - the grid was repaired and is flagged as degraded
    Warning,
    /// Error - the grid could not be built
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Info => write!(f, "info"),
            DiagnosticLevel::Warning => write!(f, "warning"),
            DiagnosticLevel::Error => write!(f, "error"),
        }
    }
}

/// A single diagnostic message
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity level
    pub level: DiagnosticLevel,
    /// Human-readable message
    pub message: String,
    /// Physical row index (0-indexed)
    pub row: Option<usize>,
    /// Index of the cell within its row (0-indexed)
    pub cell: Option<usize>,
    /// Suggested fix
    pub suggestion: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(level: DiagnosticLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            row: None,
            cell: None,
            suggestion: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Info, message)
    }

    /// Add location information
    pub fn at(mut self, row: usize, cell: usize) -> Self {
        self.row = Some(row);
        self.cell = Some(cell);
        self
    }

    /// Add row-only location information
    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    /// Add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.message)?;

        match (self.row, self.cell) {
            (Some(row), Some(cell)) => write!(f, "\n  --> row {}, cell {}", row, cell)?,
            (Some(row), None) => write!(f, "\n  --> row {}", row)?,
            _ => {}
        }

        if let Some(ref suggestion) = self.suggestion {
            write!(f, "\n  = help: {}", suggestion)?;
        }

        Ok(())
    }
}

/// Check result with summary
#[derive(Debug, Default)]
pub struct CheckResult {
    /// All diagnostics
    pub diagnostics: Vec<Diagnostic>,
    /// Number of errors
    pub errors: usize,
    /// Number of warnings
    pub warnings: usize,
    /// Number of info messages
    pub infos: usize,
    /// Logical grid dimensions (rows, columns)
    pub dimensions: (usize, usize),
}

impl CheckResult {
    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        let mut result = CheckResult::default();
        for diag in diagnostics {
            result.add(diag);
        }
        result
    }

    pub fn add(&mut self, diag: Diagnostic) {
        match diag.level {
            DiagnosticLevel::Error => self.errors += 1,
            DiagnosticLevel::Warning => self.warnings += 1,
            DiagnosticLevel::Info => self.infos += 1,
        }
        self.diagnostics.push(diag);
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// A degraded grid is one that needed repairs beyond padding
    pub fn is_degraded(&self) -> bool {
        self.errors > 0 || self.warnings > 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{}x{} grid: {} error(s), {} warning(s), {} info(s)",
            self.dimensions.0, self.dimensions.1, self.errors, self.warnings, self.infos
        )
    }
}

/// Build the logical grid for a table and collect everything that needed repair
pub fn check_table(table: &Table) -> CheckResult {
    let grid = Grid::build(table);
    let mut result = CheckResult::from_diagnostics(grid.diagnostics().to_vec());
    result.dimensions = (grid.height(), grid.width());
    if let Err(err) = grid.check_invariants() {
        result.add(Diagnostic::new(DiagnosticLevel::Error, err.to_string()));
    }
    result
}

/// Format diagnostics for terminal output
pub fn format_diagnostics(result: &CheckResult, use_color: bool) -> String {
    let mut output = String::new();

    for diag in &result.diagnostics {
        if use_color {
            let color = match diag.level {
                DiagnosticLevel::Error => "\x1b[31m",   // Red
                DiagnosticLevel::Warning => "\x1b[33m", // Yellow
                DiagnosticLevel::Info => "\x1b[34m",    // Blue
            };
            output.push_str(color);
            output.push_str(&format!("{}", diag));
            output.push_str("\x1b[0m\n\n");
        } else {
            output.push_str(&format!("{}\n\n", diag));
        }
    }

    if use_color {
        if result.has_errors() {
            output.push_str("\x1b[31m");
        } else if result.warnings > 0 {
            output.push_str("\x1b[33m");
        } else {
            output.push_str("\x1b[32m");
        }
    }

    output.push_str(&format!("Summary: {}", result.summary()));

    if use_color {
        output.push_str("\x1b[0m");
    }

    output
}
