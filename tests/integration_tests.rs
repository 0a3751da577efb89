//! Integration tests for Tablecraft editing and table conversion

use tablecraft::{
    check_table, insert_table, parse_latex_table, parse_table, parse_typst_table, table_to_latex,
    table_to_typst, Cell, CellAddress, CellKind, CommandOutcome, EngineOptions, Format, Grid,
    InsertTableOptions, Row, RowSection, Selection, Table, TableEditor, TableError,
};

fn layout(table: &Table) -> Vec<Vec<String>> {
    Grid::build(table)
        .layout()
        .into_iter()
        .map(|row| row.into_iter().map(String::from).collect())
        .collect()
}

fn grid_of(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|s| s.to_string()).collect())
        .collect()
}

fn exec(editor: &mut TableEditor, table: &mut Table, selection: Selection, name: &str) -> CommandOutcome {
    editor
        .execute_named(table, &selection, name, None)
        .unwrap_or_else(|e| panic!("{} failed: {}", name, e))
}

// ============================================================================
// Editing scenarios
// ============================================================================

mod editing {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merge_all_then_split() {
        let mut table = Table::from_rows([vec!["a", "b"], vec!["c", "d"]]);
        let mut editor = TableEditor::new();

        exec(&mut editor, &mut table, Selection::range((0, 0), (1, 1)), "mergeCells");
        assert_eq!(table.rows[0].cells.len(), 1);
        assert_eq!(table.rows[0].cells[0].rowspan, 2);
        assert_eq!(table.rows[0].cells[0].colspan, 2);

        exec(&mut editor, &mut table, Selection::cell(0, 0), "splitCells");
        assert_eq!(layout(&table), grid_of(&[&["a b c d", ""], &["", ""]]));
        assert!(table.rows.iter().flat_map(|r| &r.cells).all(|c| c.rowspan == 1 && c.colspan == 1));
    }

    #[test]
    fn test_insert_row_widens_straddling_span() {
        let mut table = Table::new(2);
        table.push_row(Row::with_cells(vec![Cell::with_span("A", 1, 2), Cell::new("B")]));
        table.push_row(Row::with_cells(vec![Cell::new("C")]));
        let mut editor = TableEditor::new();

        exec(&mut editor, &mut table, Selection::cell(0, 1), "insertRowAfter");
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0].cells[0].rowspan, 3);
        assert_eq!(table.rows[1].cells.len(), 1);
        assert_eq!(layout(&table), grid_of(&[&["A", "B"], &["A", ""], &["A", "C"]]));
    }

    #[test]
    fn test_insert_table_rejects_zero_rows() {
        assert_eq!(
            insert_table(0, 3, &InsertTableOptions::default()),
            Err(TableError::InvalidDimensions { rows: 0, cols: 3 })
        );
    }

    #[test]
    fn test_copy_column_into_other_table() {
        let mut source = Table::from_rows([
            vec!["a0", "b0", "c0"],
            vec!["a1", "b1", "c1"],
            vec!["a2", "b2", "c2"],
        ]);
        let mut dest = Table::from_rows([vec!["x", "y"], vec!["z", "w"]]);
        let mut editor = TableEditor::new();

        assert_eq!(
            exec(&mut editor, &mut source, Selection::cell(0, 1), "copyCol"),
            CommandOutcome::Copied { rows: 3, columns: 1 }
        );
        let outcome = exec(&mut editor, &mut dest, Selection::cell(0, 0), "pasteColAfter");
        assert_eq!(outcome, CommandOutcome::Changed { cursor: CellAddress::new(0, 1) });
        assert_eq!(dest.num_cols(), 3);
        assert_eq!(
            layout(&dest),
            grid_of(&[&["x", "b0", "y"], &["z", "b1", "w"], &["", "b2", ""]])
        );
    }

    #[test]
    fn test_repeated_paste_does_not_share_cells() {
        let mut table = Table::from_rows([vec!["a", "b"], vec!["c", "d"]]);
        let mut editor = TableEditor::new();
        exec(&mut editor, &mut table, Selection::cell(0, 0), "copyRow");
        exec(&mut editor, &mut table, Selection::cell(1, 0), "pasteRowAfter");
        exec(&mut editor, &mut table, Selection::cell(2, 0), "pasteRowAfter");
        assert_eq!(
            layout(&table),
            grid_of(&[&["a", "b"], &["c", "d"], &["a", "b"], &["a", "b"]])
        );
    }

    #[test]
    fn test_delete_only_column() {
        let mut table = Table::from_rows([vec!["a"], vec!["b"]]);
        let before = table.clone();
        let mut editor = TableEditor::new();
        assert_eq!(
            editor.execute_named(&mut table, &Selection::cell(0, 0), "deleteCol", None),
            Err(TableError::GridEmptied { axis: "column" })
        );
        assert_eq!(table, before);
    }

    #[test]
    fn test_irregular_merge_is_rejected() {
        let mut table = Table::new(3);
        table.push_row(Row::with_cells(vec![Cell::with_span("A", 2, 1), Cell::new("B")]));
        table.push_row(Row::with_cells(vec![Cell::new("C"), Cell::new("D"), Cell::new("E")]));
        let before = table.clone();
        let mut editor = TableEditor::new();

        let selection = Selection::Cells(vec![CellAddress::new(0, 0), CellAddress::new(1, 2)]);
        assert!(matches!(
            editor.execute_named(&mut table, &selection, "mergeCells", None),
            Err(TableError::IrregularSelection { .. })
        ));
        assert_eq!(table, before);
        assert_eq!(editor.run(&mut table, &selection, &tablecraft::TableCommand::Merge), None);
    }

    #[test]
    fn test_header_commands() {
        let mut table = Table::from_rows([vec!["a", "b"], vec!["c", "d"], vec!["e", "f"]]);
        let mut editor = TableEditor::new();

        exec(&mut editor, &mut table, Selection::cell(0, 0), "setRowType");
        assert_eq!(table.rows[0].section, RowSection::Head);

        editor
            .execute_named(&mut table, &Selection::cell(2, 0), "setRowType", Some("footer"))
            .unwrap();
        assert_eq!(table.rows[2].section, RowSection::Foot);

        exec(&mut editor, &mut table, Selection::cell(1, 0), "setColType");
        assert!(table.rows.iter().all(|r| r.cells[0].kind == CellKind::Header));
        assert!(table.rows.iter().all(|r| r.cells[1].kind == CellKind::Data));
    }

    #[test]
    fn test_cut_last_row_erases_when_configured() {
        let mut table = Table::from_rows([vec!["only", "row"]]);
        let mut editor = TableEditor::with_options(EngineOptions::lenient());
        assert_eq!(
            exec(&mut editor, &mut table, Selection::cell(0, 0), "cutRow"),
            CommandOutcome::Erased
        );
        assert!(editor.clipboard().rows().is_some());
    }
}

// ============================================================================
// Format conversion
// ============================================================================

mod conversion {
    use super::*;
    use pretty_assertions::assert_eq;

    const SPANNED_LATEX: &str = r"\begin{tabular}{|l|l|l|}
\hline
\multirow{2}{*}{A} & B & C \\
 & D & E \\
\multicolumn{2}{c}{F} & G \\
\hline
\end{tabular}";

    #[test]
    fn test_latex_placeholders_consumed() {
        let table = parse_latex_table(SPANNED_LATEX).unwrap();
        assert_eq!(table.rows[1].cells.len(), 2);
        assert_eq!(
            layout(&table),
            grid_of(&[&["A", "B", "C"], &["A", "D", "E"], &["F", "F", "G"]])
        );
    }

    #[test]
    fn test_latex_to_typst_and_back() {
        let table = parse_latex_table(SPANNED_LATEX).unwrap();
        let typst = table_to_typst(&table);
        assert!(typst.contains("table.cell(rowspan: 2)[A]"));

        let from_typst = parse_typst_table(&typst).unwrap();
        assert_eq!(layout(&from_typst), layout(&table));

        let latex = table_to_latex(&from_typst);
        assert!(latex.contains(r"\multirow{2}{*}{A}"));
        assert_eq!(layout(&parse_latex_table(&latex).unwrap()), layout(&table));
    }

    #[test]
    fn test_edit_parsed_table_and_write_back() {
        let mut table = parse_latex_table(SPANNED_LATEX).unwrap();
        let mut editor = TableEditor::new();
        exec(&mut editor, &mut table, Selection::cell(0, 0), "insertColAfter");

        let latex = table_to_latex(&table);
        let reparsed = parse_latex_table(&latex).unwrap();
        assert_eq!(
            layout(&reparsed),
            grid_of(&[
                &["A", "", "B", "C"],
                &["A", "", "D", "E"],
                &["F", "F", "F", "G"],
            ])
        );
    }

    #[test]
    fn test_typst_header_rows() {
        let input = "#table(\n  columns: 2,\n  table.header([Name], [Qty]),\n  [apple], [3],\n)";
        let (table, format) = parse_table(input, None).unwrap();
        assert_eq!(format, Format::Typst);
        assert_eq!(table.rows[0].section, RowSection::Head);
        assert_eq!(table.rows[1].section, RowSection::Body);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_round_trip() {
        let (table, _) = insert_table(2, 2, &InsertTableOptions::default()).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        let back: Table = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}

// ============================================================================
// Structural checks
// ============================================================================

mod checks {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_overrunning_rowspan_is_degraded() {
        let mut table = Table::from_rows([vec!["a", "b"], vec!["c", "d"]]);
        table.rows[0].cells[1].rowspan = 4;
        let result = check_table(&table);
        assert!(result.is_degraded());
        assert!(Grid::try_build(&table).is_err());

        let mut editor = TableEditor::with_options(EngineOptions::strict());
        assert!(matches!(
            editor.execute_named(&mut table, &Selection::cell(0, 0), "deleteRow", None),
            Err(TableError::MalformedTable { .. })
        ));
    }

    #[test]
    fn test_well_formed_table_is_clean() {
        let (table, _) = insert_table(3, 3, &InsertTableOptions::default()).unwrap();
        let result = check_table(&table);
        assert!(!result.is_degraded());
        assert!(!result.has_errors());
        assert!(Grid::build(&table).check_invariants().is_ok());
    }
}
