//! Feature modules - table formats and cell styling
//!
//! - `latex`: `tabular`, `tabularx` and `longtable` with multicolumn/multirow
//! - `typst`: `table(...)` calls with header and footer groups
//! - `styles`: applying style maps to physical cells

pub mod latex;
pub mod styles;
pub mod typst;

pub use latex::{parse_latex_table, table_to_latex};
pub use styles::{CellStyler, InlineStyler};
pub use typst::{parse_typst_table, table_to_typst};

use lazy_static::lazy_static;
use regex::Regex;

use crate::document::Table;
use crate::utils::error::{TableError, TableResult};

lazy_static! {
    static ref LATEX_ENV: Regex = Regex::new(r"\\begin\s*\{(?:tabularx|longtable|tabular)\}").unwrap();
    static ref TYPST_TABLE: Regex = Regex::new(r"(?:^|[^.\w])table\s*\(").unwrap();
}

/// Table source format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Format {
    Latex,
    Typst,
}

impl Format {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "latex" | "tex" => Some(Format::Latex),
            "typst" | "typ" => Some(Format::Typst),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::Latex => "latex",
            Format::Typst => "typst",
        }
    }
}

/// Detect the format of a table source
///
/// A LaTeX table environment wins over a `table(` call, since LaTeX
/// bodies may mention the word.
pub fn detect_format(input: &str) -> Option<Format> {
    if LATEX_ENV.is_match(input) {
        Some(Format::Latex)
    } else if TYPST_TABLE.is_match(input) {
        Some(Format::Typst)
    } else {
        None
    }
}

/// Parse a table in either format
pub fn parse_table(input: &str, format: Option<Format>) -> TableResult<(Table, Format)> {
    let format = match format.or_else(|| detect_format(input)) {
        Some(format) => format,
        None => return Err(TableError::parse("no LaTeX or Typst table found")),
    };
    let table = match format {
        Format::Latex => parse_latex_table(input)?,
        Format::Typst => parse_typst_table(input)?,
    };
    Ok((table, format))
}

pub fn render_table(table: &Table, format: Format) -> String {
    match format {
        Format::Latex => table_to_latex(table),
        Format::Typst => table_to_typst(table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format() {
        assert_eq!(
            detect_format("\\begin{tabular}{ll}\na & b\n\\end{tabular}"),
            Some(Format::Latex)
        );
        assert_eq!(
            detect_format("#table(columns: 2, [a], [b])"),
            Some(Format::Typst)
        );
        assert_eq!(detect_format("#figure(table.cell[x])"), None);
        assert_eq!(detect_format("plain text"), None);
    }

    #[test]
    fn test_parse_table_reports_format() {
        let (table, format) = parse_table("#table(columns: 2, [a], [b])", None).unwrap();
        assert_eq!(format, Format::Typst);
        assert_eq!(table.rows.len(), 1);
        assert!(parse_table("nothing here", None).is_err());
    }

    #[test]
    fn test_format_names() {
        assert_eq!(Format::from_name("TeX"), Some(Format::Latex));
        assert_eq!(Format::from_name("typ"), Some(Format::Typst));
        assert_eq!(Format::from_name("html"), None);
        assert_eq!(Format::Typst.name(), "typst");
    }
}
