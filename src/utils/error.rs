//! Error handling for Tablecraft
//!
//! This module provides a unified error type and result type for grid
//! building, target resolution, transforms and markup codecs.

use thiserror::Error;

/// Table engine error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// The selection does not point inside any table grid
    #[error("Selection is not inside a table")]
    NotInTable,

    /// The physical structure could not be resolved into a consistent grid
    #[error("Malformed table: {message}")]
    MalformedTable { message: String },

    /// The merge target does not tile its bounding box exactly
    #[error("Irregular selection: {message}")]
    IrregularSelection { message: String },

    /// The operation would leave a grid with zero rows or zero columns
    #[error("Operation would leave the table without {axis}s")]
    GridEmptied { axis: &'static str },

    /// Table dimensions are not positive
    #[error("Invalid table dimensions {rows}x{cols}: rows and columns must be positive")]
    InvalidDimensions { rows: usize, cols: usize },

    /// Paste requested but the clipboard holds nothing of the right kind
    #[error("Clipboard holds no {kind} to paste")]
    ClipboardEmpty { kind: &'static str },

    /// Command name is not in the command table
    #[error("Unknown command '{name}'")]
    UnknownCommand { name: String },

    /// Markup could not be parsed
    #[error("{}", format_parse(.message, .line))]
    Parse { message: String, line: Option<usize> },

    /// A grid failed its structural invariants (indicates a bug)
    #[error("Internal error: inconsistent grid: {message}")]
    Inconsistent { message: String },

    /// IO error (for file operations)
    #[error("IO error: {message}")]
    Io { message: String },
}

fn format_parse(message: &str, line: &Option<usize>) -> String {
    match line {
        Some(l) => format!("Parse error at line {}: {}", l, message),
        None => format!("Parse error: {}", message),
    }
}

impl From<std::io::Error> for TableError {
    fn from(err: std::io::Error) -> Self {
        TableError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;

// Convenience constructors for errors
impl TableError {
    pub fn malformed(message: impl Into<String>) -> Self {
        TableError::MalformedTable {
            message: message.into(),
        }
    }

    pub fn irregular(message: impl Into<String>) -> Self {
        TableError::IrregularSelection {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        TableError::Parse {
            message: message.into(),
            line: None,
        }
    }

    pub fn parse_at(message: impl Into<String>, line: usize) -> Self {
        TableError::Parse {
            message: message.into(),
            line: Some(line),
        }
    }

    pub fn inconsistent(message: impl Into<String>) -> Self {
        TableError::Inconsistent {
            message: message.into(),
        }
    }

    /// Whether the command boundary should treat this error as a silent no-op
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, TableError::Inconsistent { .. } | TableError::Io { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = TableError::parse("unexpected token");
        assert!(err.to_string().contains("Parse error"));
        assert!(err.to_string().contains("unexpected token"));
    }

    #[test]
    fn test_parse_error_with_line() {
        let err = TableError::parse_at("unbalanced brace", 10);
        assert!(err.to_string().contains("line 10"));
    }

    #[test]
    fn test_invalid_dimensions() {
        let msg = TableError::InvalidDimensions { rows: 0, cols: 3 }.to_string();
        assert!(msg.contains("0x3"));
    }

    #[test]
    fn test_recoverable() {
        assert!(TableError::NotInTable.is_recoverable());
        assert!(TableError::GridEmptied { axis: "row" }.is_recoverable());
        assert!(!TableError::inconsistent("overlap").is_recoverable());
    }
}
