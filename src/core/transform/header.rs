//! Header and row role changes
//!
//! These reclassify cells or rows in place and never change the grid shape.

use super::Outcome;
use crate::core::grid::{Axis, Bounds, Grid};
use crate::core::options::HeaderType;
use crate::core::target::Target;
use crate::document::{CellKind, RowSection};
use crate::utils::error::TableResult;

/// Role a row can be given
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowType {
    Header,
    Body,
    Footer,
}

impl RowType {
    pub fn from_name(name: &str) -> Option<Self> {
        match RowSection::from_tag(name)? {
            RowSection::Head => Some(RowType::Header),
            RowSection::Body => Some(RowType::Body),
            RowSection::Foot => Some(RowType::Footer),
        }
    }
}

/// Make every target cell a header or data cell
pub fn set_cell_type(grid: &Grid, target: &Target, kind: CellKind) -> TableResult<Outcome> {
    let mut out = grid.clone();
    for id in target.cells(grid) {
        out.cell_mut(id).data.kind = kind;
    }
    Ok(Outcome::new(out, target.origin()))
}

/// Give the target rows a role
///
/// A header row is made according to `header_type`. Body and footer rows
/// get data cells; footer rows move into the foot section.
pub fn set_row_type(
    grid: &Grid,
    target: &Target,
    row_type: RowType,
    header_type: HeaderType,
) -> TableResult<Outcome> {
    let rows = target.range(grid, Axis::Row);
    let (section, kind) = match row_type {
        RowType::Header => (
            header_type.moves_section().then_some(RowSection::Head),
            header_type.marks_cells().then_some(CellKind::Header),
        ),
        RowType::Body => (Some(RowSection::Body), Some(CellKind::Data)),
        RowType::Footer => (Some(RowSection::Foot), Some(CellKind::Data)),
    };

    let mut out = grid.clone();
    if let Some(section) = section {
        for row in rows.clone() {
            if let Some(meta) = out.row_meta_mut(row) {
                meta.section = section;
            }
        }
    }
    if let Some(kind) = kind {
        let band = Bounds::new((rows.start, 0), (rows.end - 1, grid.width().saturating_sub(1)));
        for id in grid.cells_touching(&band) {
            out.cell_mut(id).data.kind = kind;
        }
    }
    Ok(Outcome::new(out, target.origin()))
}

/// Make or unmake header cells across the target columns
pub fn set_col_type(grid: &Grid, target: &Target, kind: CellKind) -> TableResult<Outcome> {
    let cols = target.range(grid, Axis::Column);
    let band = Bounds::new(
        (0, cols.start),
        (grid.height().saturating_sub(1), cols.end - 1),
    );
    let mut out = grid.clone();
    for id in grid.cells_touching(&band) {
        out.cell_mut(id).data.kind = kind;
    }
    Ok(Outcome::new(out, target.origin()))
}
