//! Logical grid built from a physical table

use log::{debug, warn};

use super::cell::{Axis, Bounds, CellId, GridCell, RowMeta, Slot};
use crate::document::{Cell, CellAddress, ColSpec, Row, Table, TableFrame};
use crate::utils::diagnostics::{Diagnostic, DiagnosticLevel};
use crate::utils::error::{TableError, TableResult};

/// Rectangular logical view of a table
///
/// Every position holds either the anchor of a cell or a back-reference to
/// the cell spanning over it. Cells live in an arena kept in reading order.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<GridCell>,
    slots: Vec<Vec<Slot>>,
    rows: Vec<RowMeta>,
    columns: Vec<ColSpec>,
    frame: TableFrame,
    degraded: bool,
    diagnostics: Vec<Diagnostic>,
}

/// Owned, unchecked pieces of a grid
///
/// Transforms take a grid apart, rewrite the cell list and reassemble it;
/// [`GridParts::assemble`] re-derives the slots and rejects anything that
/// breaks rectangularity.
#[derive(Debug, Clone, Default)]
pub struct GridParts {
    pub rows: Vec<RowMeta>,
    pub columns: Vec<ColSpec>,
    pub frame: TableFrame,
    pub cells: Vec<GridCell>,
}

impl GridParts {
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of lines along an axis
    pub fn extent(&self, axis: Axis) -> usize {
        match axis {
            Axis::Row => self.rows.len(),
            Axis::Column => self.columns.len(),
        }
    }

    /// Build the grid; every position must be covered by exactly one cell
    pub fn assemble(self) -> TableResult<Grid> {
        self.assemble_inner(false)
    }

    /// Build the grid, filling uncovered positions with empty unit cells
    pub fn assemble_filled(self) -> TableResult<Grid> {
        self.assemble_inner(true)
    }

    fn assemble_inner(mut self, fill: bool) -> TableResult<Grid> {
        let height = self.rows.len();
        let width = self.columns.len();

        for cell in &self.cells {
            if cell.rowspan() == 0 || cell.colspan() == 0 {
                return Err(TableError::inconsistent(format!(
                    "cell at ({}, {}) has a zero span",
                    cell.row, cell.col
                )));
            }
            if cell.end(Axis::Row) > height || cell.end(Axis::Column) > width {
                return Err(TableError::inconsistent(format!(
                    "cell at ({}, {}) extends past the {}x{} grid",
                    cell.row, cell.col, height, width
                )));
            }
        }

        let mut owners = occupancy(&self.cells, height, width)?;

        let holes: Vec<(usize, usize)> = (0..height)
            .flat_map(|r| (0..width).map(move |c| (r, c)))
            .filter(|&(r, c)| owners[r][c].is_none())
            .collect();
        if let Some(&(r, c)) = holes.first() {
            if !fill {
                return Err(TableError::inconsistent(format!(
                    "position ({}, {}) is not covered by any cell",
                    r, c
                )));
            }
            self.cells
                .extend(holes.iter().map(|&(r, c)| GridCell::blank(r, c)));
            owners = occupancy(&self.cells, height, width)?;
        }

        // Stable sort keeps ids in reading order without reshuffling equal keys
        let mut order: Vec<usize> = (0..self.cells.len()).collect();
        order.sort_by_key(|&i| (self.cells[i].row, self.cells[i].col));
        let mut remap = vec![0; self.cells.len()];
        for (new, &old) in order.iter().enumerate() {
            remap[old] = new;
        }
        let mut cells: Vec<Option<GridCell>> = self.cells.into_iter().map(Some).collect();
        let cells: Vec<GridCell> = order.iter().filter_map(|&i| cells[i].take()).collect();

        let slots = (0..height)
            .map(|r| {
                (0..width)
                    .map(|c| {
                        // occupancy() already proved every position is owned
                        let id = CellId(remap[owners[r][c].unwrap_or_default()]);
                        let cell = &cells[id.0];
                        if cell.row == r && cell.col == c {
                            Slot::Anchor(id)
                        } else {
                            Slot::Spanned(id)
                        }
                    })
                    .collect()
            })
            .collect();

        Ok(Grid {
            cells,
            slots,
            rows: self.rows,
            columns: self.columns,
            frame: self.frame,
            degraded: false,
            diagnostics: Vec::new(),
        })
    }
}

/// Owner index per position; fails on overlap
fn occupancy(
    cells: &[GridCell],
    height: usize,
    width: usize,
) -> TableResult<Vec<Vec<Option<usize>>>> {
    let mut owners = vec![vec![None; width]; height];
    for (i, cell) in cells.iter().enumerate() {
        for (r, c) in cell.bounds().positions() {
            if let Some(other) = owners[r][c] {
                let other: &GridCell = &cells[other];
                return Err(TableError::inconsistent(format!(
                    "cells at ({}, {}) and ({}, {}) overlap at ({}, {})",
                    other.row, other.col, cell.row, cell.col, r, c
                )));
            }
            owners[r][c] = Some(i);
        }
    }
    Ok(owners)
}

impl Grid {
    /// Resolve a physical table into its logical grid
    ///
    /// Structural problems are repaired rather than rejected; repairs that
    /// change the meaning of the markup mark the grid as degraded.
    pub fn build(table: &Table) -> Grid {
        let height = table.rows.len();
        let mut builder = Builder::new(height);

        for (r, row) in table.rows.iter().enumerate() {
            let mut cursor = 0;
            for (i, physical) in row.cells.iter().enumerate() {
                cursor = builder.place(r, i, cursor, physical);
            }
        }

        let width = builder.width().max(table.colspecs.len());
        builder.pad(width);

        let mut columns = table.colspecs.clone();
        columns.resize(width, ColSpec::default());
        let rows = table
            .rows
            .iter()
            .map(|row| RowMeta {
                section: row.section,
                has_bottom_border: row.has_bottom_border,
            })
            .collect();

        let parts = GridParts {
            rows,
            columns,
            frame: table.frame.clone(),
            cells: builder.cells,
        };

        let mut grid = match parts.assemble() {
            Ok(grid) => grid,
            Err(err) => {
                // Builder output never overlaps
                warn!("grid assembly failed after recovery: {}", err);
                let mut fallback = Grid::empty();
                fallback.degraded = true;
                fallback
                    .diagnostics
                    .push(Diagnostic::new(DiagnosticLevel::Error, err.to_string()));
                return fallback;
            }
        };
        grid.degraded = builder.degraded;
        grid.diagnostics = builder.diagnostics;
        if grid.degraded {
            debug!(
                "built degraded {}x{} grid with {} diagnostic(s)",
                grid.height(),
                grid.width(),
                grid.diagnostics.len()
            );
        }
        grid
    }

    /// Like [`Grid::build`], but a degraded result is an error
    pub fn try_build(table: &Table) -> TableResult<Grid> {
        let grid = Grid::build(table);
        if grid.degraded {
            let message = grid
                .diagnostics
                .iter()
                .find(|d| d.level >= DiagnosticLevel::Warning)
                .map(|d| d.message.clone())
                .unwrap_or_else(|| "table structure needed repair".to_string());
            return Err(TableError::malformed(message));
        }
        Ok(grid)
    }

    pub fn empty() -> Grid {
        Grid {
            cells: Vec::new(),
            slots: Vec::new(),
            rows: Vec::new(),
            columns: Vec::new(),
            frame: TableFrame::default(),
            degraded: false,
            diagnostics: Vec::new(),
        }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn extent(&self, axis: Axis) -> usize {
        match axis {
            Axis::Row => self.height(),
            Axis::Column => self.width(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn frame(&self) -> &TableFrame {
        &self.frame
    }

    pub fn row_meta(&self, row: usize) -> Option<&RowMeta> {
        self.rows.get(row)
    }

    pub fn column(&self, col: usize) -> Option<&ColSpec> {
        self.columns.get(col)
    }

    pub fn slot(&self, row: usize, col: usize) -> Option<Slot> {
        self.slots.get(row)?.get(col).copied()
    }

    /// Id of the cell covering a position
    pub fn anchor_at(&self, row: usize, col: usize) -> Option<CellId> {
        self.slot(row, col).map(|s| s.id())
    }

    pub fn cell(&self, id: CellId) -> &GridCell {
        &self.cells[id.0]
    }

    pub fn get(&self, id: CellId) -> Option<&GridCell> {
        self.cells.get(id.0)
    }

    /// Cells in reading order
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn ids(&self) -> impl Iterator<Item = CellId> {
        (0..self.cells.len()).map(CellId)
    }

    /// Distinct cells covering any position of `bounds`, in reading order
    pub fn cells_touching(&self, bounds: &Bounds) -> Vec<CellId> {
        self.ids()
            .filter(|&id| self.cell(id).bounds().intersects(bounds))
            .collect()
    }

    /// Cells whose whole rectangle lies inside `bounds`, in reading order
    pub fn cells_within(&self, bounds: &Bounds) -> Vec<CellId> {
        self.ids()
            .filter(|&id| bounds.contains_bounds(&self.cell(id).bounds()))
            .collect()
    }

    /// Grow `bounds` until no cell straddles its edge
    pub fn expand(&self, bounds: Bounds) -> Bounds {
        let mut current = bounds;
        loop {
            let next = self
                .cells_touching(&current)
                .into_iter()
                .fold(current, |acc, id| acc.union(&self.cell(id).bounds()));
            if next == current {
                return current;
            }
            current = next;
        }
    }

    /// Cell for a physical address (row index, cell index within the row)
    pub fn locate(&self, address: CellAddress) -> Option<CellId> {
        self.ids()
            .filter(|&id| self.cell(id).row == address.row)
            .nth(address.cell)
    }

    /// Physical address a cell would have if the grid were emitted as-is
    pub fn address_of(&self, id: CellId) -> CellAddress {
        let row = self.cell(id).row;
        let cell = self.cells[..id.0].iter().filter(|c| c.row == row).count();
        CellAddress { row, cell }
    }

    /// Content of the cell covering each position, row by row
    pub fn layout(&self) -> Vec<Vec<&str>> {
        self.slots
            .iter()
            .map(|row| {
                row.iter()
                    .map(|slot| self.cell(slot.id()).data.content.as_str())
                    .collect()
            })
            .collect()
    }

    /// Clone the grid into editable parts
    pub fn to_parts(&self) -> GridParts {
        GridParts {
            rows: self.rows.clone(),
            columns: self.columns.clone(),
            frame: self.frame.clone(),
            cells: self.cells.clone(),
        }
    }

    /// Mutable access for in-place reclassification (no shape change)
    pub(crate) fn cell_mut(&mut self, id: CellId) -> &mut GridCell {
        &mut self.cells[id.0]
    }

    pub(crate) fn row_meta_mut(&mut self, row: usize) -> Option<&mut RowMeta> {
        self.rows.get_mut(row)
    }

    /// Verify the structural invariants of the grid
    pub fn check_invariants(&self) -> TableResult<()> {
        let height = self.height();
        let width = self.width();
        if self.slots.len() != height {
            return Err(TableError::inconsistent(format!(
                "{} slot rows for {} rows",
                self.slots.len(),
                height
            )));
        }
        for (r, row) in self.slots.iter().enumerate() {
            if row.len() != width {
                return Err(TableError::inconsistent(format!(
                    "row {} has {} positions, expected {}",
                    r,
                    row.len(),
                    width
                )));
            }
            for (c, slot) in row.iter().enumerate() {
                let cell = self
                    .get(slot.id())
                    .ok_or_else(|| TableError::inconsistent(format!("dangling slot ({}, {})", r, c)))?;
                if !cell.bounds().contains(r, c) {
                    return Err(TableError::inconsistent(format!(
                        "slot ({}, {}) points at a cell that does not cover it",
                        r, c
                    )));
                }
                if slot.is_anchor() != (cell.row == r && cell.col == c) {
                    return Err(TableError::inconsistent(format!(
                        "slot ({}, {}) has the wrong ownership kind",
                        r, c
                    )));
                }
            }
        }
        let covered: usize = self.cells.iter().map(|c| c.bounds().area()).sum();
        if covered != height * width {
            return Err(TableError::inconsistent(format!(
                "cells cover {} positions of a {}x{} grid",
                covered, height, width
            )));
        }
        Ok(())
    }

    /// Emit the physical table
    pub fn serialize(&self) -> Table {
        self.serialize_with_cursor(None).0
    }

    /// Emit the physical table and map a cursor cell to its physical address
    ///
    /// Every line is emitted, including rows whose positions are all spanned
    /// from above; they become physical rows without cells, so declared spans
    /// survive. Use [`Grid::compact`] first to drop such lines.
    pub fn serialize_with_cursor(&self, cursor: Option<CellId>) -> (Table, Option<CellAddress>) {
        let address = cursor
            .filter(|id| id.0 < self.cells.len())
            .map(|id| self.address_of(id));

        let mut rows: Vec<Row> = self
            .rows
            .iter()
            .map(|meta| Row {
                cells: Vec::new(),
                section: meta.section,
                has_bottom_border: meta.has_bottom_border,
            })
            .collect();
        for cell in &self.cells {
            rows[cell.row].cells.push(cell.data.clone());
        }

        let table = Table {
            colspecs: self.columns.clone(),
            rows,
            frame: self.frame.clone(),
        };
        (table, address)
    }

    /// Drop rows and columns that no cell is anchored in
    ///
    /// Cells spanning across a dropped line shrink by one. Cell order and
    /// therefore ids are preserved.
    pub fn compact(&self) -> Grid {
        let mut parts = self.to_parts();
        let mut changed = false;
        for axis in [Axis::Row, Axis::Column] {
            let mut index = parts.extent(axis);
            while index > 0 {
                index -= 1;
                if parts.cells.iter().any(|c| c.start(axis) == index) {
                    continue;
                }
                changed = true;
                for cell in parts.cells.iter_mut() {
                    if cell.start(axis) > index {
                        let start = cell.start(axis);
                        cell.set_start(axis, start - 1);
                    } else if cell.end(axis) > index {
                        let span = cell.span(axis);
                        cell.set_span(axis, span - 1);
                    }
                }
                match axis {
                    Axis::Row => {
                        let removed = parts.rows.remove(index);
                        if removed.has_bottom_border && index > 0 {
                            parts.rows[index - 1].has_bottom_border = true;
                        }
                    }
                    Axis::Column => {
                        parts.columns.remove(index);
                    }
                }
            }
        }
        if !changed {
            return self.clone();
        }
        debug!("eliminated empty lines from {}x{} grid", self.height(), self.width());
        match parts.assemble() {
            Ok(grid) => grid,
            Err(err) => {
                warn!("empty line elimination failed: {}", err);
                self.clone()
            }
        }
    }
}

/// Incremental placement state for [`Grid::build`]
struct Builder {
    height: usize,
    owners: Vec<Vec<bool>>,
    cells: Vec<GridCell>,
    degraded: bool,
    diagnostics: Vec<Diagnostic>,
}

impl Builder {
    fn new(height: usize) -> Self {
        Builder {
            height,
            owners: vec![Vec::new(); height],
            cells: Vec::new(),
            degraded: false,
            diagnostics: Vec::new(),
        }
    }

    fn is_taken(&self, row: usize, col: usize) -> bool {
        self.owners[row].get(col).copied().unwrap_or(false)
    }

    fn take(&mut self, row: usize, col: usize) {
        let line = &mut self.owners[row];
        if line.len() <= col {
            line.resize(col + 1, false);
        }
        line[col] = true;
    }

    fn width(&self) -> usize {
        self.owners.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    fn repair(&mut self, diag: Diagnostic) {
        warn!("{}", diag.message);
        self.degraded = true;
        self.diagnostics.push(diag);
    }

    /// Place one physical cell; returns the column after it
    fn place(&mut self, row: usize, index: usize, cursor: usize, physical: &Cell) -> usize {
        let mut col = cursor;
        while self.is_taken(row, col) {
            col += 1;
        }

        let mut data = physical.clone();
        if data.rowspan == 0 {
            self.repair(Diagnostic::warning("rowspan of 0 treated as 1").at(row, index));
            data.rowspan = 1;
        }
        if data.colspan == 0 {
            self.repair(Diagnostic::warning("colspan of 0 treated as 1").at(row, index));
            data.colspan = 1;
        }
        if row + data.rowspan > self.height {
            let clamped = self.height - row;
            self.repair(
                Diagnostic::warning(format!(
                    "rowspan {} runs past the last row, clamped to {}",
                    data.rowspan, clamped
                ))
                .at(row, index)
                .with_suggestion("reduce the rowspan or add rows"),
            );
            data.rowspan = clamped;
        }

        let mut rows = row..row + data.rowspan;
        let mut free = (col..col + data.colspan)
            .take_while(|&c| rows.clone().all(|r| !self.is_taken(r, c)))
            .count();
        if free == 0 {
            self.repair(
                Diagnostic::warning(format!(
                    "rowspan {} collides with a span from above, treated as 1",
                    data.rowspan
                ))
                .at(row, index),
            );
            data.rowspan = 1;
            rows = row..row + 1;
            free = 1;
        }
        if free < data.colspan {
            self.repair(
                Diagnostic::warning(format!(
                    "colspan {} overlaps a span from above, clamped to {}",
                    data.colspan, free
                ))
                .at(row, index),
            );
            data.colspan = free;
        }

        for r in rows {
            for c in col..col + data.colspan {
                self.take(r, c);
            }
        }
        self.cells.push(GridCell::new(row, col, data));
        col + free
    }

    /// Fill every uncovered position up to `width` with an empty unit cell
    fn pad(&mut self, width: usize) {
        for row in 0..self.height {
            let missing: Vec<usize> = (0..width).filter(|&c| !self.is_taken(row, c)).collect();
            if missing.is_empty() {
                continue;
            }
            self.diagnostics.push(
                Diagnostic::info(format!(
                    "row padded with {} empty cell(s) to width {}",
                    missing.len(),
                    width
                ))
                .at_row(row),
            );
            for col in missing {
                self.take(row, col);
                self.cells.push(GridCell::blank(row, col));
            }
        }
    }
}
