//! Physical table structure
//!
//! This is the structure the grid engine reads from and writes back to: a
//! table is a list of rows, and each row holds only the cells that start in
//! it. Positions covered by a cell spanning down from a row above are not
//! represented at all; they are implied by the spans.

use indexmap::IndexMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ordered style properties (CSS property name → value)
pub type StyleMap = IndexMap<String, String>;

/// Cell alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Alignment {
    #[default]
    Default,
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Parse from LaTeX alignment character
    pub fn from_latex_char(c: char) -> Self {
        match c {
            'l' => Alignment::Left,
            'c' => Alignment::Center,
            'r' => Alignment::Right,
            'p' | 'm' | 'b' | 'X' => Alignment::Left, // paragraph types
            _ => Alignment::Default,
        }
    }

    /// Convert to LaTeX alignment character
    pub fn to_latex_char(&self) -> char {
        match self {
            Alignment::Left | Alignment::Default => 'l',
            Alignment::Center => 'c',
            Alignment::Right => 'r',
        }
    }

    /// Parse from a Typst alignment keyword
    pub fn from_typst(s: &str) -> Self {
        match s.trim() {
            "left" => Alignment::Left,
            "center" => Alignment::Center,
            "right" => Alignment::Right,
            _ => Alignment::Default,
        }
    }

    /// Convert to Typst alignment
    pub fn to_typst(&self) -> &'static str {
        match self {
            Alignment::Left | Alignment::Default => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

/// Column width specification
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ColWidth {
    /// Auto-determined width
    #[default]
    Auto,
    /// Fractional share of the remaining width (`X` column, Typst `fr`)
    Fixed(f64),
    /// Percentage of table width
    Percent(f64),
}

/// Column specification
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ColSpec {
    pub alignment: Alignment,
    pub width: ColWidth,
    pub has_left_border: bool,
    pub has_right_border: bool,
}

/// Whether a cell is a header cell (`th`) or a data cell (`td`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CellKind {
    #[default]
    Data,
    Header,
}

impl CellKind {
    pub fn is_header(&self) -> bool {
        matches!(self, CellKind::Header)
    }

    /// Parse the host's `td`/`th` spelling
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "td" | "data" => Some(CellKind::Data),
            "th" | "header" => Some(CellKind::Header),
            _ => None,
        }
    }
}

/// Role of a row inside the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RowSection {
    Head,
    #[default]
    Body,
    Foot,
}

impl RowSection {
    /// Parse the host's `thead`/`tbody`/`tfoot` spelling
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "thead" | "header" | "head" => Some(RowSection::Head),
            "tbody" | "body" => Some(RowSection::Body),
            "tfoot" | "footer" | "foot" => Some(RowSection::Foot),
            _ => None,
        }
    }
}

/// A single physical table cell
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Cell {
    /// Cell content (opaque to the grid engine)
    pub content: String,
    /// Number of columns this cell spans
    pub colspan: usize,
    /// Number of rows this cell spans
    pub rowspan: usize,
    /// Header or data cell
    pub kind: CellKind,
    /// Cell-specific alignment (overrides column default)
    pub alignment: Option<Alignment>,
    /// Inline style properties
    pub styles: StyleMap,
}

impl Cell {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            colspan: 1,
            rowspan: 1,
            kind: CellKind::Data,
            alignment: None,
            styles: StyleMap::new(),
        }
    }

    pub fn with_span(content: impl Into<String>, colspan: usize, rowspan: usize) -> Self {
        Self {
            colspan,
            rowspan,
            ..Self::new(content)
        }
    }

    pub fn header(content: impl Into<String>) -> Self {
        Self {
            kind: CellKind::Header,
            ..Self::new(content)
        }
    }

    pub fn empty() -> Self {
        Self::new(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// A blank cell carrying this cell's kind, for structural fill-ins
    pub fn blank_like(&self) -> Self {
        Self {
            kind: self.kind,
            ..Self::empty()
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::empty()
    }
}

/// A physical table row
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Row {
    pub cells: Vec<Cell>,
    pub section: RowSection,
    /// Whether this row has a bottom border (hline)
    pub has_bottom_border: bool,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cells(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            ..Self::default()
        }
    }

    pub fn in_section(mut self, section: RowSection) -> Self {
        self.section = section;
        self
    }

    pub fn push(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() || self.cells.iter().all(|c| c.is_empty())
    }
}

/// Table caption
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Caption {
    pub short: Option<String>,
    pub long: String,
}

/// Table-level attributes that the grid engine carries through untouched
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TableFrame {
    pub caption: Option<Caption>,
    /// Table label for cross-referencing
    pub label: Option<String>,
    /// Whether the table has a top border
    pub has_top_border: bool,
}

/// Complete physical table
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Table {
    /// Column specifications
    pub colspecs: Vec<ColSpec>,
    /// Rows in document order
    pub rows: Vec<Row>,
    pub frame: TableFrame,
}

impl Table {
    pub fn new(num_cols: usize) -> Self {
        Self {
            colspecs: vec![ColSpec::default(); num_cols],
            rows: Vec::new(),
            frame: TableFrame::default(),
        }
    }

    /// Build a table of unit cells from row-major text content
    pub fn from_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows: Vec<Row> = rows
            .into_iter()
            .map(|r| Row::with_cells(r.into_iter().map(Cell::new).collect()))
            .collect();
        let width = rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
        Self {
            colspecs: vec![ColSpec::default(); width],
            rows,
            frame: TableFrame::default(),
        }
    }

    pub fn num_cols(&self) -> usize {
        self.colspecs.len()
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Rows of one section, in document order
    pub fn section_rows(&self, section: RowSection) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(move |r| r.section == section)
    }

    /// Physical cell at an address
    pub fn cell(&self, address: CellAddress) -> Option<&Cell> {
        self.rows.get(address.row)?.cells.get(address.cell)
    }

    pub fn cell_mut(&mut self, address: CellAddress) -> Option<&mut Cell> {
        self.rows.get_mut(address.row)?.cells.get_mut(address.cell)
    }
}

/// Physical position of a cell: row index and index within that row's cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellAddress {
    pub row: usize,
    pub cell: usize,
}

impl CellAddress {
    pub fn new(row: usize, cell: usize) -> Self {
        Self { row, cell }
    }
}

impl std::fmt::Display for CellAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.row, self.cell)
    }
}

impl std::str::FromStr for CellAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, cell) = s
            .split_once(':')
            .ok_or_else(|| format!("expected ROW:CELL, got '{}'", s))?;
        let row = row
            .trim()
            .parse()
            .map_err(|_| format!("invalid row in '{}'", s))?;
        let cell = cell
            .trim()
            .parse()
            .map_err(|_| format!("invalid cell in '{}'", s))?;
        Ok(Self { row, cell })
    }
}
