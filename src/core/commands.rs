//! Host command surface
//!
//! Commands are looked up by name in a static table and run by a
//! [`TableEditor`], which owns the collaborators a command may need: the
//! engine options, the clipboard and the cell styler. Every command builds
//! a fresh grid from the physical table, resolves its target, runs one
//! transform and writes the table back only when all of that succeeded.
//!
//! ```rust
//! use tablecraft::core::commands::{TableCommand, TableEditor};
//! use tablecraft::core::target::Selection;
//! use tablecraft::document::Table;
//!
//! let mut table = Table::from_rows([vec!["a", "b"], vec!["c", "d"]]);
//! let mut editor = TableEditor::new();
//! let command = TableCommand::parse("insertRowAfter", None).unwrap();
//! editor.execute(&mut table, &Selection::cell(0, 0), &command).unwrap();
//! assert_eq!(table.rows.len(), 3);
//! ```

use log::debug;
use phf::phf_map;

use crate::core::clipboard::Clipboard;
use crate::core::grid::{Axis, Grid};
use crate::core::options::{DegradedPolicy, EngineOptions, HeaderType};
use crate::core::target::{resolve_menu, resolve_paste, Placement, Selection, Target, TargetKind};
use crate::core::transform::{self, Outcome, RowType};
use crate::document::{Cell, CellAddress, CellKind, Row, RowSection, StyleMap, Table};
use crate::features::styles::{CellStyler, InlineStyler};
use crate::utils::error::{TableError, TableResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Command names understood by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    InsertRowBefore,
    InsertRowAfter,
    InsertColBefore,
    InsertColAfter,
    DeleteRow,
    DeleteCol,
    MergeCells,
    SplitCells,
    CutRow,
    CutCol,
    CopyRow,
    CopyCol,
    PasteRowBefore,
    PasteRowAfter,
    PasteColBefore,
    PasteColAfter,
    SetCellType,
    SetRowType,
    SetColType,
    ApplyCellStyle,
    EraseTable,
}

static COMMANDS: phf::Map<&'static str, CommandKind> = phf_map! {
    "insertRowBefore" => CommandKind::InsertRowBefore,
    "insertRowAfter" => CommandKind::InsertRowAfter,
    "insertColBefore" => CommandKind::InsertColBefore,
    "insertColAfter" => CommandKind::InsertColAfter,
    "deleteRow" => CommandKind::DeleteRow,
    "deleteCol" => CommandKind::DeleteCol,
    "mergeCells" => CommandKind::MergeCells,
    "splitCells" => CommandKind::SplitCells,
    "cutRow" => CommandKind::CutRow,
    "cutCol" => CommandKind::CutCol,
    "copyRow" => CommandKind::CopyRow,
    "copyCol" => CommandKind::CopyCol,
    "pasteRowBefore" => CommandKind::PasteRowBefore,
    "pasteRowAfter" => CommandKind::PasteRowAfter,
    "pasteColBefore" => CommandKind::PasteColBefore,
    "pasteColAfter" => CommandKind::PasteColAfter,
    "setCellType" => CommandKind::SetCellType,
    "setRowType" => CommandKind::SetRowType,
    "setColType" => CommandKind::SetColType,
    "applyCellStyle" => CommandKind::ApplyCellStyle,
    "eraseTable" => CommandKind::EraseTable,
};

/// Look up a command by its host name
pub fn command_kind(name: &str) -> Option<CommandKind> {
    COMMANDS.get(name).copied()
}

/// Every command name, in no particular order
pub fn command_names() -> impl Iterator<Item = &'static str> {
    COMMANDS.keys().copied()
}

/// A command together with its argument
#[derive(Debug, Clone, PartialEq)]
pub enum TableCommand {
    Insert { axis: Axis, placement: Placement },
    Delete { axis: Axis },
    Merge,
    Split,
    Copy { axis: Axis },
    Cut { axis: Axis },
    Paste { axis: Axis, placement: Placement },
    SetCellType(CellKind),
    SetRowType(RowType),
    SetColType(CellKind),
    ApplyCellStyle(StyleMap),
    EraseTable,
}

impl TableCommand {
    /// Build a command from its name and optional textual argument
    ///
    /// Type commands take `header`/`data` (rows also `body`/`footer`) and
    /// default to header. `applyCellStyle` takes `key=value` pairs
    /// separated by `;`.
    pub fn parse(name: &str, arg: Option<&str>) -> TableResult<Self> {
        let kind = command_kind(name).ok_or_else(|| TableError::UnknownCommand {
            name: name.to_string(),
        })?;
        let bad_arg = |value: &str| TableError::parse(format!("invalid argument '{}' for {}", value, name));

        let command = match kind {
            CommandKind::InsertRowBefore => TableCommand::insert(Axis::Row, Placement::Before),
            CommandKind::InsertRowAfter => TableCommand::insert(Axis::Row, Placement::After),
            CommandKind::InsertColBefore => TableCommand::insert(Axis::Column, Placement::Before),
            CommandKind::InsertColAfter => TableCommand::insert(Axis::Column, Placement::After),
            CommandKind::DeleteRow => TableCommand::Delete { axis: Axis::Row },
            CommandKind::DeleteCol => TableCommand::Delete { axis: Axis::Column },
            CommandKind::MergeCells => TableCommand::Merge,
            CommandKind::SplitCells => TableCommand::Split,
            CommandKind::CutRow => TableCommand::Cut { axis: Axis::Row },
            CommandKind::CutCol => TableCommand::Cut { axis: Axis::Column },
            CommandKind::CopyRow => TableCommand::Copy { axis: Axis::Row },
            CommandKind::CopyCol => TableCommand::Copy { axis: Axis::Column },
            CommandKind::PasteRowBefore => TableCommand::paste(Axis::Row, Placement::Before),
            CommandKind::PasteRowAfter => TableCommand::paste(Axis::Row, Placement::After),
            CommandKind::PasteColBefore => TableCommand::paste(Axis::Column, Placement::Before),
            CommandKind::PasteColAfter => TableCommand::paste(Axis::Column, Placement::After),
            CommandKind::SetCellType | CommandKind::SetColType => {
                let cell_kind = match arg {
                    Some(value) => CellKind::from_tag(value).ok_or_else(|| bad_arg(value))?,
                    None => CellKind::Header,
                };
                if kind == CommandKind::SetCellType {
                    TableCommand::SetCellType(cell_kind)
                } else {
                    TableCommand::SetColType(cell_kind)
                }
            }
            CommandKind::SetRowType => {
                let row_type = match arg {
                    Some(value) => RowType::from_name(value)
                        .or_else(|| CellKind::from_tag(value).map(|k| match k {
                            CellKind::Header => RowType::Header,
                            CellKind::Data => RowType::Body,
                        }))
                        .ok_or_else(|| bad_arg(value))?,
                    None => RowType::Header,
                };
                TableCommand::SetRowType(row_type)
            }
            CommandKind::ApplyCellStyle => {
                let value = arg.ok_or_else(|| bad_arg(""))?;
                TableCommand::ApplyCellStyle(parse_style_map(value).ok_or_else(|| bad_arg(value))?)
            }
            CommandKind::EraseTable => TableCommand::EraseTable,
        };
        Ok(command)
    }

    fn insert(axis: Axis, placement: Placement) -> Self {
        TableCommand::Insert { axis, placement }
    }

    fn paste(axis: Axis, placement: Placement) -> Self {
        TableCommand::Paste { axis, placement }
    }

    /// Whether the command can change the grid's shape
    pub fn changes_shape(&self) -> bool {
        matches!(
            self,
            TableCommand::Insert { .. }
                | TableCommand::Delete { .. }
                | TableCommand::Merge
                | TableCommand::Split
                | TableCommand::Cut { .. }
                | TableCommand::Paste { .. }
        )
    }
}

/// Parse `key=value;key=value` style pairs
///
/// Returns `None` when a pair has no `=`.
pub fn parse_style_map(input: &str) -> Option<StyleMap> {
    input
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            pair.split_once('=')
                .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

/// What a successful command did
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "camelCase"))]
pub enum CommandOutcome {
    /// The table was rewritten; move the selection to `cursor`
    Changed { cursor: CellAddress },
    /// A fragment of the given size is now on the clipboard
    Copied { rows: usize, columns: usize },
    /// Styles were applied to this many cells
    Styled { cells: usize },
    /// The host should remove the whole table
    Erased,
    /// Nothing to do
    Unchanged,
}

fn clipboard_kind(axis: Axis) -> &'static str {
    match axis {
        Axis::Row => "rows",
        Axis::Column => "columns",
    }
}

/// Runs commands against physical tables
pub struct TableEditor {
    options: EngineOptions,
    clipboard: Clipboard,
    styler: Box<dyn CellStyler>,
}

impl Default for TableEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl TableEditor {
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Self {
            options,
            clipboard: Clipboard::new(),
            styler: Box::new(InlineStyler),
        }
    }

    /// Replace the collaborator that applies cell styles
    pub fn with_styler(mut self, styler: impl CellStyler + 'static) -> Self {
        self.styler = Box::new(styler);
        self
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn clipboard_mut(&mut self) -> &mut Clipboard {
        &mut self.clipboard
    }

    /// Run a command, reporting failures
    ///
    /// On error `table` and the clipboard are left as they were.
    pub fn execute(
        &mut self,
        table: &mut Table,
        selection: &Selection,
        command: &TableCommand,
    ) -> TableResult<CommandOutcome> {
        let start = selection.start().ok_or(TableError::NotInTable)?;
        debug!("running {:?} at {}", command, start);

        let grid = if command.changes_shape()
            && self.options.degraded_policy == DegradedPolicy::RejectDestructive
        {
            Grid::try_build(table)?
        } else {
            Grid::build(table)
        };
        let menu = |kind: TargetKind| resolve_menu(&grid, start, selection, kind);

        let outcome = match command {
            TableCommand::Insert { axis, placement } => {
                let target = menu(TargetKind::for_axis(*axis))?;
                transform::insert(&grid, &target, *axis, *placement)?
            }
            TableCommand::Delete { axis } => {
                let target = menu(TargetKind::for_axis(*axis))?;
                match self.emptied(transform::delete(&grid, &target, *axis))? {
                    Some(outcome) => outcome,
                    None => return Ok(CommandOutcome::Erased),
                }
            }
            TableCommand::Merge => {
                let target = menu(TargetKind::Block)?;
                transform::merge(&grid, &target, &self.options.merge_separator)?
            }
            TableCommand::Split => {
                let target = menu(TargetKind::Block)?;
                transform::split(&grid, &target)?
            }
            TableCommand::Copy { axis } => {
                let target = menu(TargetKind::for_axis(*axis))?;
                let fragment = transform::copy(&grid, &target, *axis)?;
                let copied = CommandOutcome::Copied {
                    rows: fragment.grid.height(),
                    columns: fragment.grid.width(),
                };
                self.clipboard.set(fragment);
                return Ok(copied);
            }
            TableCommand::Cut { axis } => {
                let target = menu(TargetKind::for_axis(*axis))?;
                let fragment = transform::copy(&grid, &target, *axis)?;
                let deleted = self.emptied(transform::delete(&grid, &target, *axis))?;
                self.clipboard.set(fragment);
                match deleted {
                    Some(outcome) => outcome,
                    None => return Ok(CommandOutcome::Erased),
                }
            }
            TableCommand::Paste { axis, placement } => {
                let fragment = self.clipboard.get(*axis).ok_or(TableError::ClipboardEmpty {
                    kind: clipboard_kind(*axis),
                })?;
                let Target::Paste(paste) = resolve_paste(&grid, start, fragment)? else {
                    return Err(TableError::inconsistent("paste resolved to a non-paste target"));
                };
                transform::paste(&grid, &paste, *placement)?
            }
            TableCommand::SetCellType(kind) => {
                let target = menu(TargetKind::Cell)?;
                transform::set_cell_type(&grid, &target, *kind)?
            }
            TableCommand::SetRowType(row_type) => {
                let target = menu(TargetKind::Rows)?;
                transform::set_row_type(&grid, &target, *row_type, self.options.header_type)?
            }
            TableCommand::SetColType(kind) => {
                let target = menu(TargetKind::Columns)?;
                transform::set_col_type(&grid, &target, *kind)?
            }
            TableCommand::ApplyCellStyle(styles) => {
                let target = menu(TargetKind::Cell)?;
                return Ok(self.apply_styles(table, &grid, &target, styles));
            }
            TableCommand::EraseTable => {
                menu(TargetKind::Cell)?;
                return Ok(CommandOutcome::Erased);
            }
        };

        let grid = if self.options.compact_empty_lines {
            outcome.grid.compact()
        } else {
            outcome.grid
        };
        let (rewritten, cursor) = grid.serialize_with_cursor(Some(outcome.cursor));
        let cursor = cursor.ok_or_else(|| TableError::inconsistent("cursor cell was not emitted"))?;
        *table = rewritten;
        Ok(CommandOutcome::Changed { cursor })
    }

    /// Run a command the way a host menu does: failures become no-ops
    pub fn run(
        &mut self,
        table: &mut Table,
        selection: &Selection,
        command: &TableCommand,
    ) -> Option<CommandOutcome> {
        match self.execute(table, selection, command) {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                debug!("{:?} ignored: {}", command, err);
                None
            }
        }
    }

    /// Parse and run a named command
    pub fn execute_named(
        &mut self,
        table: &mut Table,
        selection: &Selection,
        name: &str,
        arg: Option<&str>,
    ) -> TableResult<CommandOutcome> {
        let command = TableCommand::parse(name, arg)?;
        self.execute(table, selection, &command)
    }

    /// Create a table, taking the header type from the engine options
    /// unless `options` names one
    pub fn insert_table(
        &self,
        rows: usize,
        cols: usize,
        options: &InsertTableOptions,
    ) -> TableResult<(Table, CellAddress)> {
        let options = InsertTableOptions {
            header_type: options.header_type.or(Some(self.options.header_type)),
            ..options.clone()
        };
        insert_table(rows, cols, &options)
    }

    /// `None` when the grid emptied and the table should be erased
    fn emptied(&self, result: TableResult<Outcome>) -> TableResult<Option<Outcome>> {
        match result {
            Err(TableError::GridEmptied { axis }) if self.options.erase_emptied_tables => {
                debug!("last {} removed, erasing table", axis);
                Ok(None)
            }
            other => other.map(Some),
        }
    }

    fn apply_styles(
        &self,
        table: &mut Table,
        grid: &Grid,
        target: &Target,
        styles: &StyleMap,
    ) -> CommandOutcome {
        let addresses: Vec<CellAddress> = target
            .cells(grid)
            .into_iter()
            .map(|id| grid.address_of(id))
            .collect();
        if addresses.is_empty() {
            return CommandOutcome::Unchanged;
        }
        let mut styled = 0;
        for address in addresses {
            // Padding cells the grid added for ragged rows have no physical cell
            if let Some(cell) = table.cell_mut(address) {
                if self.styler.apply(cell, styles) {
                    styled += 1;
                }
            }
        }
        if styled == 0 {
            CommandOutcome::Unchanged
        } else {
            CommandOutcome::Styled { cells: styled }
        }
    }
}

/// Options for a new table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct InsertTableOptions {
    /// Leading rows made into header rows
    pub header_rows: usize,
    /// Leading columns made of header cells
    pub header_columns: usize,
    /// How header rows are made; the default header type when `None`
    pub header_type: Option<HeaderType>,
}

/// Create a `rows` x `cols` table of empty unit cells
///
/// Returns the table and the address of its first cell.
pub fn insert_table(
    rows: usize,
    cols: usize,
    options: &InsertTableOptions,
) -> TableResult<(Table, CellAddress)> {
    if rows == 0 || cols == 0 {
        return Err(TableError::InvalidDimensions { rows, cols });
    }
    let header_type = options.header_type.unwrap_or_default();

    let mut table = Table::new(cols);
    for r in 0..rows {
        let header_row = r < options.header_rows;
        let cells = (0..cols)
            .map(|c| {
                if c < options.header_columns || (header_row && header_type.marks_cells()) {
                    Cell::header("")
                } else {
                    Cell::empty()
                }
            })
            .collect();
        let section = if header_row && header_type.moves_section() {
            RowSection::Head
        } else {
            RowSection::Body
        };
        table.push_row(Row::with_cells(cells).in_section(section));
    }
    debug!("created {}x{} table", rows, cols);
    Ok((table, CellAddress::new(0, 0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn two_by_two() -> Table {
        Table::from_rows([vec!["a", "b"], vec!["c", "d"]])
    }

    fn layout(table: &Table) -> Vec<Vec<String>> {
        Grid::build(table)
            .layout()
            .into_iter()
            .map(|row| row.into_iter().map(String::from).collect())
            .collect()
    }

    fn run(editor: &mut TableEditor, table: &mut Table, selection: Selection, name: &str) -> CommandOutcome {
        editor.execute_named(table, &selection, name, None).unwrap()
    }

    #[test]
    fn test_command_table() {
        assert_eq!(command_kind("insertRowBefore"), Some(CommandKind::InsertRowBefore));
        assert_eq!(command_kind("pasteColAfter"), Some(CommandKind::PasteColAfter));
        assert_eq!(command_kind("insertrowbefore"), None);
        assert_eq!(command_names().count(), 21);
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(
            TableCommand::parse("setCellType", Some("td")).unwrap(),
            TableCommand::SetCellType(CellKind::Data)
        );
        assert_eq!(
            TableCommand::parse("setRowType", Some("footer")).unwrap(),
            TableCommand::SetRowType(RowType::Footer)
        );
        assert_eq!(
            TableCommand::parse("setRowType", None).unwrap(),
            TableCommand::SetRowType(RowType::Header)
        );
        assert!(matches!(
            TableCommand::parse("setColType", Some("bogus")),
            Err(TableError::Parse { .. })
        ));
        assert!(matches!(
            TableCommand::parse("frobnicate", None),
            Err(TableError::UnknownCommand { .. })
        ));
    }

    #[test]
    fn test_parse_style_map() {
        let styles = parse_style_map("backgroundColor=red; borderWidth = 1px;").unwrap();
        assert_eq!(styles.get("backgroundColor").unwrap(), "red");
        assert_eq!(styles.get("borderWidth").unwrap(), "1px");
        assert!(parse_style_map("nonsense").is_none());
    }

    #[test]
    fn test_insert_moves_cursor_to_new_row() {
        let mut table = two_by_two();
        let mut editor = TableEditor::new();
        let outcome = run(&mut editor, &mut table, Selection::cell(0, 1), "insertRowAfter");
        assert_eq!(outcome, CommandOutcome::Changed { cursor: CellAddress::new(1, 0) });
        assert_eq!(
            layout(&table),
            vec![vec!["a", "b"], vec!["", ""], vec!["c", "d"]]
        );
    }

    #[test]
    fn test_failed_command_leaves_table() {
        let mut table = two_by_two();
        let before = table.clone();
        let mut editor = TableEditor::new();
        assert!(editor
            .execute_named(&mut table, &Selection::cell(5, 0), "deleteRow", None)
            .is_err());
        assert_eq!(
            editor.run(&mut table, &Selection::cell(5, 0), &TableCommand::Merge),
            None
        );
        assert_eq!(table, before);
    }

    #[test]
    fn test_delete_last_row() {
        let mut table = Table::from_rows([vec!["a", "b"]]);
        let mut editor = TableEditor::new();
        assert_eq!(
            editor.execute_named(&mut table, &Selection::cell(0, 0), "deleteRow", None),
            Err(TableError::GridEmptied { axis: "row" })
        );

        let mut editor = TableEditor::with_options(EngineOptions::lenient());
        assert_eq!(
            run(&mut editor, &mut table, Selection::cell(0, 0), "deleteRow"),
            CommandOutcome::Erased
        );
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_merge_then_split() {
        let mut table = two_by_two();
        let mut editor = TableEditor::new();
        let outcome = run(&mut editor, &mut table, Selection::range((0, 0), (1, 1)), "mergeCells");
        assert_eq!(outcome, CommandOutcome::Changed { cursor: CellAddress::new(0, 0) });
        assert_eq!(table.rows[0].cells[0].content, "a b c d");
        assert_eq!(table.rows[0].cells[0].rowspan, 2);
        assert_eq!(table.rows[0].cells[0].colspan, 2);

        run(&mut editor, &mut table, Selection::cell(0, 0), "splitCells");
        assert_eq!(
            layout(&table),
            vec![vec!["a b c d", ""], vec!["", ""]]
        );
    }

    #[test]
    fn test_merge_keeps_shape_unless_compacting() {
        let mut table = Table::from_rows([vec!["a", "b"], vec!["c", "d"], vec!["e", "f"]]);
        let mut editor = TableEditor::new();
        run(&mut editor, &mut table, Selection::range((0, 0), (1, 1)), "mergeCells");
        assert_eq!(table.rows.len(), 3);
        assert!(table.rows[1].cells.is_empty());
        assert_eq!(
            layout(&table),
            vec![vec!["a b c d", "a b c d"], vec!["a b c d", "a b c d"], vec!["e", "f"]]
        );

        let mut table = Table::from_rows([vec!["a", "b"], vec!["c", "d"], vec!["e", "f"]]);
        let options = EngineOptions {
            compact_empty_lines: true,
            ..Default::default()
        };
        let mut editor = TableEditor::with_options(options);
        let outcome = run(&mut editor, &mut table, Selection::range((0, 0), (1, 1)), "mergeCells");
        assert_eq!(outcome, CommandOutcome::Changed { cursor: CellAddress::new(0, 0) });
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells[0].rowspan, 1);
        assert_eq!(layout(&table), vec![vec!["a b c d", "a b c d"], vec!["e", "f"]]);
    }

    #[test]
    fn test_cut_and_paste_rows() {
        let mut table = Table::from_rows([vec!["a", "b"], vec!["c", "d"], vec!["e", "f"]]);
        let mut editor = TableEditor::new();
        assert_eq!(
            run(&mut editor, &mut table, Selection::cell(0, 0), "cutRow"),
            CommandOutcome::Changed { cursor: CellAddress::new(0, 0) }
        );
        assert_eq!(editor.clipboard().rows().map(|f| f.lines()), Some(1));

        run(&mut editor, &mut table, Selection::cell(1, 0), "pasteRowAfter");
        assert_eq!(
            layout(&table),
            vec![vec!["c", "d"], vec!["e", "f"], vec!["a", "b"]]
        );
    }

    #[test]
    fn test_paste_needs_matching_clipboard() {
        let mut table = two_by_two();
        let mut editor = TableEditor::new();
        run(&mut editor, &mut table, Selection::cell(0, 0), "copyRow");
        assert_eq!(
            editor.execute_named(&mut table, &Selection::cell(0, 0), "pasteColAfter", None),
            Err(TableError::ClipboardEmpty { kind: "columns" })
        );
    }

    #[test]
    fn test_copy_reports_size() {
        let mut table = two_by_two();
        let mut editor = TableEditor::new();
        assert_eq!(
            run(&mut editor, &mut table, Selection::range((0, 1), (1, 1)), "copyCol"),
            CommandOutcome::Copied { rows: 2, columns: 1 }
        );
        assert_eq!(table, two_by_two());
    }

    #[test]
    fn test_row_type_uses_header_type() {
        let mut table = two_by_two();
        let options = EngineOptions::default().with_header_type(HeaderType::SectionCells);
        let mut editor = TableEditor::with_options(options);
        run(&mut editor, &mut table, Selection::cell(0, 0), "setRowType");
        assert_eq!(table.rows[0].section, RowSection::Head);
        assert!(table.rows[0].cells.iter().all(|c| c.kind == CellKind::Header));
        assert_eq!(table.rows[1].cells[0].kind, CellKind::Data);
    }

    #[test]
    fn test_apply_cell_style() {
        let mut table = two_by_two();
        let mut editor = TableEditor::new();
        let outcome = editor
            .execute_named(
                &mut table,
                &Selection::range((0, 0), (0, 1)),
                "applyCellStyle",
                Some("backgroundColor=yellow"),
            )
            .unwrap();
        assert_eq!(outcome, CommandOutcome::Styled { cells: 2 });
        assert_eq!(table.rows[0].cells[1].styles.get("background-color").unwrap(), "yellow");
        assert!(table.rows[1].cells[0].styles.is_empty());

        let again = editor
            .execute_named(
                &mut table,
                &Selection::range((0, 0), (0, 1)),
                "applyCellStyle",
                Some("backgroundColor=yellow"),
            )
            .unwrap();
        assert_eq!(again, CommandOutcome::Unchanged);
    }

    #[test]
    fn test_strict_rejects_degraded_edits() {
        let mut table = two_by_two();
        table.rows[0].cells[0].rowspan = 5;
        let mut editor = TableEditor::with_options(EngineOptions::strict());
        assert!(matches!(
            editor.execute_named(&mut table, &Selection::cell(0, 1), "insertColAfter", None),
            Err(TableError::MalformedTable { .. })
        ));
        assert!(editor
            .execute_named(&mut table, &Selection::cell(0, 1), "setCellType", None)
            .is_ok());
    }

    #[test]
    fn test_erase_table() {
        let mut table = two_by_two();
        let mut editor = TableEditor::new();
        assert_eq!(
            run(&mut editor, &mut table, Selection::cell(1, 1), "eraseTable"),
            CommandOutcome::Erased
        );
    }

    #[test]
    fn test_insert_table() {
        assert_eq!(
            insert_table(0, 3, &InsertTableOptions::default()),
            Err(TableError::InvalidDimensions { rows: 0, cols: 3 })
        );

        let options = InsertTableOptions {
            header_rows: 1,
            header_columns: 1,
            header_type: Some(HeaderType::Cells),
        };
        let (table, cursor) = insert_table(3, 2, &options).unwrap();
        assert_eq!(cursor, CellAddress::new(0, 0));
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.num_cols(), 2);
        assert_eq!(table.rows[0].section, RowSection::Body);
        assert_eq!(table.rows[0].cells[1].kind, CellKind::Header);
        assert_eq!(table.rows[2].cells[0].kind, CellKind::Header);
        assert_eq!(table.rows[2].cells[1].kind, CellKind::Data);
    }

    #[test]
    fn test_editor_insert_table_header_type() {
        let editor = TableEditor::new();
        let options = InsertTableOptions {
            header_rows: 1,
            ..Default::default()
        };
        let (table, _) = editor.insert_table(2, 2, &options).unwrap();
        assert_eq!(table.rows[0].section, RowSection::Head);
        assert_eq!(table.rows[0].cells[0].kind, CellKind::Data);
    }

    mod properties {
        use super::*;
        use crate::core::grid::CellId;
        use proptest::prelude::*;

        const EDITS: [&str; 8] = [
            "insertRowBefore",
            "insertRowAfter",
            "insertColBefore",
            "insertColAfter",
            "deleteRow",
            "deleteCol",
            "mergeCells",
            "splitCells",
        ];

        fn labelled(height: usize, width: usize) -> Table {
            Table::from_rows((0..height).map(|r| (0..width).map(move |c| format!("{}.{}", r, c))))
        }

        fn edits() -> impl Strategy<Value = Vec<(usize, usize, usize)>> {
            proptest::collection::vec((0..EDITS.len(), 0usize..16, 0usize..16), 1..12)
        }

        proptest! {
            #[test]
            fn edits_survive_rebuild(height in 1usize..5, width in 1usize..5, steps in edits()) {
                let mut table = labelled(height, width);
                let mut editor = TableEditor::new();

                for (edit, a, b) in steps {
                    let name = EDITS[edit];
                    let before = Grid::build(&table);
                    let anchors = before.cells().len();
                    let first = CellId(a % anchors);
                    let start = before.address_of(first);
                    let selection = if name == "mergeCells" {
                        Selection::Range { start, end: before.address_of(CellId(b % anchors)) }
                    } else {
                        Selection::Cell(start)
                    };
                    let command = TableCommand::parse(name, None).unwrap();
                    let snapshot = table.clone();

                    let Some(outcome) = editor.run(&mut table, &selection, &command) else {
                        prop_assert_eq!(&table, &snapshot);
                        continue;
                    };
                    let CommandOutcome::Changed { cursor } = outcome else {
                        return Err(TestCaseError::fail(format!("{} reported {:?}", name, outcome)));
                    };

                    // The written table is exactly what a rebuild serializes again
                    let after = Grid::build(&table);
                    prop_assert!(!after.is_degraded());
                    prop_assert!(after.check_invariants().is_ok());
                    prop_assert_eq!(&after.serialize(), &table);
                    prop_assert_eq!(table.rows.len(), after.height());
                    prop_assert!(after.locate(cursor).is_some());

                    let (h0, w0) = (before.height(), before.width());
                    let (h1, w1) = (after.height(), after.width());
                    let picked = before.cell(first).bounds();
                    match name {
                        "insertRowBefore" | "insertRowAfter" => {
                            prop_assert_eq!((h1, w1), (h0 + picked.height(), w0))
                        }
                        "insertColBefore" | "insertColAfter" => {
                            prop_assert_eq!((h1, w1), (h0, w0 + picked.width()))
                        }
                        "deleteRow" => prop_assert_eq!((h1, w1), (h0 - picked.height(), w0)),
                        "deleteCol" => prop_assert_eq!((h1, w1), (h0, w0 - picked.width())),
                        "mergeCells" => {
                            prop_assert_eq!((h1, w1), (h0, w0));
                            let merged = after.locate(cursor).map(|id| after.cell(id).bounds());
                            let Some(merged) = merged else { continue };
                            let absorbed = before.cells_within(&merged);
                            let covered: usize =
                                absorbed.iter().map(|&id| before.cell(id).bounds().area()).sum();
                            prop_assert_eq!(covered, merged.area());
                            prop_assert_eq!(after.cells().len(), anchors + 1 - absorbed.len());
                        }
                        _ => {
                            prop_assert_eq!((h1, w1), (h0, w0));
                            prop_assert_eq!(after.cells().len(), anchors + picked.area() - 1);
                            prop_assert!(after
                                .cells_within(&picked)
                                .iter()
                                .all(|&id| after.cell(id).bounds().area() == 1));
                        }
                    }
                }
            }
        }
    }
}
