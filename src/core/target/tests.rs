use super::*;
use crate::core::clipboard::Fragment;
use crate::core::grid::{Axis, Bounds, Grid};
use crate::document::{Cell, CellAddress, Row, Table};
use crate::utils::error::TableError;
use pretty_assertions::assert_eq;

/// ```text
/// A B C
/// D B E
/// ```
fn straddled() -> Grid {
    let mut table = Table::new(3);
    table.push_row(Row::with_cells(vec![
        Cell::new("A"),
        Cell::with_span("B", 1, 2),
        Cell::new("C"),
    ]));
    table.push_row(Row::with_cells(vec![Cell::new("D"), Cell::new("E")]));
    Grid::build(&table)
}

fn content(grid: &Grid, id: crate::core::grid::CellId) -> &str {
    &grid.cell(id).data.content
}

#[test]
fn test_resolve_cell() {
    let grid = straddled();
    let target = resolve_cell(&grid, CellAddress::new(1, 1)).unwrap();
    assert!(matches!(target, Target::Cell(_)));
    assert_eq!(content(&grid, target.origin()), "E");
    assert_eq!(target.bounds(&grid), Bounds::single(1, 2));
}

#[test]
fn test_resolve_outside_grid() {
    let grid = straddled();
    assert_eq!(
        resolve_cell(&grid, CellAddress::new(1, 2)).unwrap_err(),
        TableError::NotInTable
    );
    let selection = Selection::range((0, 0), (4, 0));
    assert_eq!(
        resolve_menu(&grid, CellAddress::new(0, 0), &selection, TargetKind::Rows).unwrap_err(),
        TableError::NotInTable
    );
}

#[test]
fn test_range_rows_and_columns() {
    let grid = straddled();
    let selection = Selection::range((0, 0), (1, 0));
    let start = CellAddress::new(0, 0);

    let rows = resolve_menu(&grid, start, &selection, TargetKind::Rows).unwrap();
    assert_eq!(rows.range(&grid, Axis::Row), 0..2);

    let cols = resolve_menu(&grid, start, &selection, TargetKind::Columns).unwrap();
    assert_eq!(cols.range(&grid, Axis::Column), 0..1);
    assert_eq!(cols.bounds(&grid), Bounds::new((0, 0), (1, 0)));
}

#[test]
fn test_straddling_span_widens_box() {
    // B and C only sit in row 0, but B reaches into row 1
    let grid = straddled();
    let selection = Selection::range((0, 1), (0, 2));
    let target = resolve_menu(&grid, CellAddress::new(0, 1), &selection, TargetKind::Block).unwrap();
    assert_eq!(target.bounds(&grid), Bounds::new((0, 1), (1, 2)));
    let names: Vec<&str> = target.cells(&grid).into_iter().map(|id| content(&grid, id)).collect();
    assert_eq!(names, vec!["B", "C", "E"]);
}

#[test]
fn test_single_cell_uses_full_extent() {
    let grid = straddled();
    let start = CellAddress::new(0, 1);
    let selection = Selection::Cell(start);

    let rows = resolve_menu(&grid, start, &selection, TargetKind::Rows).unwrap();
    assert_eq!(rows.range(&grid, Axis::Row), 0..2);

    let cell = resolve_menu(&grid, start, &selection, TargetKind::Cell).unwrap();
    assert!(matches!(cell, Target::Cell(_)));
    assert_eq!(content(&grid, cell.origin()), "B");
}

#[test]
fn test_explicit_cell_set() {
    let grid = straddled();
    let selection = Selection::Cells(vec![CellAddress::new(0, 0), CellAddress::new(1, 1)]);
    let target = resolve_menu(&grid, CellAddress::new(0, 0), &selection, TargetKind::Cell).unwrap();
    match &target {
        Target::Block { bounds, cells, .. } => {
            assert_eq!(*bounds, Bounds::new((0, 0), (1, 2)));
            assert_eq!(cells.len(), 2);
        }
        other => panic!("expected a block, got {:?}", other),
    }
}

#[test]
fn test_resolve_paste() {
    let grid = straddled();
    let fragment = Fragment::new(Axis::Row, Grid::build(&Table::from_rows([vec!["x", "y"]])));
    let target = resolve_paste(&grid, CellAddress::new(0, 1), &fragment).unwrap();
    let Target::Paste(paste) = target else {
        panic!("expected a paste target");
    };
    assert_eq!(paste.insert_index(Placement::Before), 0);
    assert_eq!(paste.insert_index(Placement::After), 2);
    assert_eq!(paste.extent(Placement::After, 3), Bounds::new((2, 0), (2, 2)));
}
