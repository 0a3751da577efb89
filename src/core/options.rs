//! Engine configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a row becomes a header row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum HeaderType {
    /// Move the row into the head section, cells unchanged
    #[default]
    Section,
    /// Turn the row's cells into header cells, section unchanged
    Cells,
    /// Both
    SectionCells,
}

impl HeaderType {
    pub fn moves_section(&self) -> bool {
        matches!(self, HeaderType::Section | HeaderType::SectionCells)
    }

    pub fn marks_cells(&self) -> bool {
        matches!(self, HeaderType::Cells | HeaderType::SectionCells)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "section" => Some(HeaderType::Section),
            "cells" => Some(HeaderType::Cells),
            "sectioncells" => Some(HeaderType::SectionCells),
            _ => None,
        }
    }
}

/// What structural commands do with a grid that needed repair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum DegradedPolicy {
    /// Edit the repaired grid
    #[default]
    Proceed,
    /// Fail shape-changing commands with `MalformedTable`
    RejectDestructive,
}

/// Options for the table editor
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineOptions {
    /// Header type used by `setRowType` and `insertTable`
    pub header_type: HeaderType,
    pub degraded_policy: DegradedPolicy,
    /// Joins the non-empty contents of merged cells
    pub merge_separator: String,
    /// Report `Erased` instead of `GridEmptied` when a delete empties the table
    pub erase_emptied_tables: bool,
    /// Drop rows and columns left without an anchored cell after each edit
    ///
    /// Off by default, so a block merged over whole rows keeps its rowspan.
    pub compact_empty_lines: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            header_type: HeaderType::default(),
            degraded_policy: DegradedPolicy::default(),
            merge_separator: " ".to_string(),
            erase_emptied_tables: false,
            compact_empty_lines: false,
        }
    }
}

impl EngineOptions {
    /// Refuse to restructure tables that needed repair
    pub fn strict() -> Self {
        Self {
            degraded_policy: DegradedPolicy::RejectDestructive,
            ..Default::default()
        }
    }

    /// Tolerate everything; deleting the last row or column erases the table
    pub fn lenient() -> Self {
        Self {
            erase_emptied_tables: true,
            ..Default::default()
        }
    }

    pub fn with_header_type(mut self, header_type: HeaderType) -> Self {
        self.header_type = header_type;
        self
    }

    pub fn with_merge_separator(mut self, separator: impl Into<String>) -> Self {
        self.merge_separator = separator.into();
        self
    }
}
