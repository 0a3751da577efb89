//! Typst `table(...)` reading and writing
//!
//! Typst lists cells flat and places them row by row, skipping positions
//! already covered by a `rowspan`. The reader replays that placement to
//! recover physical rows; the writer emits each row's anchored cells in
//! order, which Typst places back into the same positions.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::core::grid::Grid;
use crate::document::{Alignment, Caption, Cell, ColSpec, ColWidth, Row, RowSection, Table};
use crate::utils::error::{TableError, TableResult};

lazy_static! {
    static ref TABLE_START: Regex = Regex::new(r"(?:^|[^.\w])table\s*\(").unwrap();
    static ref NAMED_ARG: Regex = Regex::new(r"(?s)^([A-Za-z][\w-]*)\s*:\s*(.*)$").unwrap();
    static ref CAPTION_ARG: Regex = Regex::new(r"caption\s*:\s*\[").unwrap();
    static ref LABEL: Regex = Regex::new(r"\)\s*<([^>\s]+)>").unwrap();
}

// ============================================================================
// Scanning
// ============================================================================

/// Bracket and string nesting of Typst code and markup
#[derive(Default)]
struct Nesting {
    stack: Vec<char>,
    in_string: bool,
    in_math: bool,
    escaped: bool,
}

impl Nesting {
    /// Feed one char; returns whether it sits at the top level
    fn feed(&mut self, c: char) -> bool {
        let top = self.stack.is_empty() && !self.in_string && !self.in_math && !self.escaped;
        if self.escaped {
            self.escaped = false;
            return false;
        }
        if c == '\\' {
            self.escaped = true;
            return top;
        }
        if self.in_string {
            if c == '"' {
                self.in_string = false;
            }
            return false;
        }
        if self.in_math {
            if c == '$' {
                self.in_math = false;
            }
            return false;
        }
        // Inside [markup] only square brackets nest
        let markup = self.stack.last() == Some(&'[');
        match c {
            '[' => self.stack.push(c),
            ']' if markup => {
                self.stack.pop();
            }
            _ if markup => {}
            '(' | '{' => self.stack.push(c),
            ')' | ']' | '}' => {
                self.stack.pop();
            }
            '"' => self.in_string = true,
            '$' => self.in_math = true,
            _ => {}
        }
        top
    }
}

/// Byte index of the bracket closing the one `s` starts with
fn closing(s: &str) -> Option<usize> {
    let mut nesting = Nesting::default();
    for (i, c) in s.char_indices() {
        nesting.feed(c);
        if i > 0 && nesting.stack.is_empty() && !nesting.in_string && !nesting.in_math {
            return Some(i);
        }
    }
    None
}

/// Split call arguments at top-level commas
fn split_args(s: &str) -> Vec<&str> {
    let mut args = Vec::new();
    let mut nesting = Nesting::default();
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if nesting.feed(c) && c == ',' {
            args.push(s[start..i].trim());
            start = i + 1;
        }
    }
    args.push(s[start..].trim());
    args.retain(|a| !a.is_empty());
    args
}

/// Split `(args)` and any trailing `[content]` blocks off a call
fn call_parts(rest: &str) -> Option<(Vec<&str>, Vec<&str>)> {
    let rest = rest.trim_start();
    let (args, mut tail) = if rest.starts_with('(') {
        let end = closing(rest)?;
        (split_args(&rest[1..end]), &rest[end + 1..])
    } else {
        (Vec::new(), rest)
    };
    let mut trailing = Vec::new();
    loop {
        let trimmed = tail.trim_start();
        if !trimmed.starts_with('[') {
            break;
        }
        let end = closing(trimmed)?;
        trailing.push(trimmed[1..end].trim());
        tail = &trimmed[end + 1..];
    }
    Some((args, trailing))
}

fn line_of(input: &str, byte: usize) -> usize {
    input[..byte].matches('\n').count() + 1
}

// ============================================================================
// Parsing
// ============================================================================

enum Item {
    Cell(Cell, RowSection),
    Rule,
    /// Header or footer group boundary
    GroupEdge,
}

/// Parse the first `table(...)` call in `input`
pub fn parse_typst_table(input: &str) -> TableResult<Table> {
    let found = TABLE_START
        .find(input)
        .ok_or_else(|| TableError::parse("no table(...) call found"))?;
    let open = found.end() - 1;
    let close = closing(&input[open..])
        .ok_or_else(|| TableError::parse_at("unclosed table(", line_of(input, open)))?;
    let args = split_args(&input[open + 1..open + close]);

    let mut colspecs: Vec<ColSpec> = Vec::new();
    let mut alignments: Vec<Alignment> = Vec::new();
    let mut items = Vec::new();
    for arg in args {
        if let Some(caps) = NAMED_ARG.captures(arg) {
            let value = caps[2].trim();
            match &caps[1] {
                "columns" => colspecs = parse_columns(value),
                "align" => alignments = parse_alignments(value),
                other => debug!("ignoring table argument '{}'", other),
            }
            continue;
        }
        parse_item(arg, RowSection::Body, &mut items)?;
    }

    if colspecs.is_empty() {
        colspecs.push(ColSpec::default());
    }
    match alignments.as_slice() {
        [] => {}
        [single] => colspecs.iter_mut().for_each(|c| c.alignment = *single),
        many => {
            for (spec, align) in colspecs.iter_mut().zip(many) {
                spec.alignment = *align;
            }
        }
    }

    let mut placer = Placer::new(colspecs.len());
    for item in items {
        match item {
            Item::Cell(cell, section) => placer.place(cell, section),
            Item::Rule => placer.rule(),
            Item::GroupEdge => placer.break_row(),
        }
    }

    let mut table = Table::new(colspecs.len());
    table.colspecs = colspecs;
    table.frame.has_top_border = placer.top_border;
    table.rows = placer.finish();
    table.frame.caption = extract_caption(&input[open + close..]);
    table.frame.label = LABEL
        .captures(&input[open + close..])
        .map(|caps| caps[1].to_string());
    Ok(table)
}

fn parse_item(arg: &str, section: RowSection, items: &mut Vec<Item>) -> TableResult<()> {
    let malformed = || TableError::parse(format!("malformed table item '{}'", arg));

    let group = [
        ("table.header", RowSection::Head),
        ("table.footer", RowSection::Foot),
    ]
    .into_iter()
    .find_map(|(name, section)| arg.strip_prefix(name).map(|rest| (rest, section)));
    if let Some((rest, group_section)) = group {
        let (args, trailing) = call_parts(rest).ok_or_else(malformed)?;
        items.push(Item::GroupEdge);
        for inner in args {
            if NAMED_ARG.is_match(inner) {
                continue;
            }
            parse_item(inner, group_section, items)?;
        }
        for content in trailing {
            items.push(Item::Cell(Cell::new(content), group_section));
        }
        items.push(Item::GroupEdge);
        return Ok(());
    }

    if arg.starts_with("table.hline") {
        items.push(Item::Rule);
        return Ok(());
    }
    if arg.starts_with("table.vline") {
        return Ok(());
    }

    if let Some(rest) = arg.strip_prefix("table.cell") {
        let (args, trailing) = call_parts(rest).ok_or_else(malformed)?;
        let mut cell = Cell::empty();
        for inner in args {
            match NAMED_ARG.captures(inner) {
                Some(caps) => {
                    let value = caps[2].trim();
                    match &caps[1] {
                        "colspan" => cell.colspan = value.parse().unwrap_or(1),
                        "rowspan" => cell.rowspan = value.parse().unwrap_or(1),
                        "align" => cell.alignment = Some(Alignment::from_typst(value)),
                        "body" => cell.content = block_content(value).to_string(),
                        _ => {}
                    }
                }
                None => cell.content = block_content(inner).to_string(),
            }
        }
        if let Some(content) = trailing.first() {
            cell.content = content.to_string();
        }
        items.push(Item::Cell(cell, section));
        return Ok(());
    }

    items.push(Item::Cell(Cell::new(block_content(arg)), section));
    Ok(())
}

/// Inner text of a `[content]` block; other expressions are kept verbatim
fn block_content(expr: &str) -> &str {
    let expr = expr.trim();
    if expr.starts_with('[') && closing(expr) == Some(expr.len() - 1) {
        expr[1..expr.len() - 1].trim()
    } else {
        expr
    }
}

fn parse_columns(value: &str) -> Vec<ColSpec> {
    if let Ok(count) = value.parse::<usize>() {
        return vec![ColSpec::default(); count];
    }
    let Some(inner) = value.strip_prefix('(').and_then(|v| v.strip_suffix(')')) else {
        return vec![ColSpec::default()];
    };
    split_args(inner)
        .into_iter()
        .map(|width| ColSpec {
            width: parse_width(width),
            ..Default::default()
        })
        .collect()
}

fn parse_width(width: &str) -> ColWidth {
    if let Some(fr) = width.strip_suffix("fr") {
        if let Ok(value) = fr.trim().parse() {
            return ColWidth::Fixed(value);
        }
    }
    if let Some(percent) = width.strip_suffix('%') {
        if let Ok(value) = percent.trim().parse() {
            return ColWidth::Percent(value);
        }
    }
    ColWidth::Auto
}

fn parse_alignments(value: &str) -> Vec<Alignment> {
    match value.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => split_args(inner)
            .into_iter()
            .map(Alignment::from_typst)
            .collect(),
        None => vec![Alignment::from_typst(value)],
    }
}

fn extract_caption(after_table: &str) -> Option<Caption> {
    let found = CAPTION_ARG.find(after_table)?;
    let block = &after_table[found.end() - 1..];
    let end = closing(block)?;
    Some(Caption {
        short: None,
        long: block[1..end].trim().to_string(),
    })
}

/// Replays Typst's row-major auto-placement
struct Placer {
    width: usize,
    taken: Vec<Vec<bool>>,
    row: usize,
    col: usize,
    rows: Vec<Row>,
    top_border: bool,
}

impl Placer {
    fn new(width: usize) -> Self {
        Placer {
            width,
            taken: Vec::new(),
            row: 0,
            col: 0,
            rows: Vec::new(),
            top_border: false,
        }
    }

    fn ensure_row(&mut self, row: usize) {
        if self.taken.len() <= row {
            self.taken.resize(row + 1, vec![false; self.width]);
        }
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Row::new);
        }
    }

    /// Move to the next free position
    fn advance(&mut self) {
        loop {
            if self.col >= self.width {
                self.row += 1;
                self.col = 0;
            }
            self.ensure_row(self.row);
            if !self.taken[self.row][self.col] {
                return;
            }
            self.col += 1;
        }
    }

    fn place(&mut self, mut cell: Cell, section: RowSection) {
        self.advance();
        let (row, col) = (self.row, self.col);
        let free = (col..self.width)
            .take_while(|&c| !self.taken[row][c])
            .count();
        if cell.colspan > free {
            debug!("colspan {} clipped to {} at ({}, {})", cell.colspan, free, row, col);
        }
        cell.colspan = cell.colspan.clamp(1, free);
        cell.rowspan = cell.rowspan.max(1);

        for r in row..row + cell.rowspan {
            self.ensure_row(r);
            for c in col..col + cell.colspan {
                self.taken[r][c] = true;
            }
        }
        if self.rows[row].cells.is_empty() {
            self.rows[row].section = section;
        }
        self.col += cell.colspan;
        self.rows[row].push(cell);
    }

    /// Finish the current row unless it has not started
    fn break_row(&mut self) {
        if self.col > 0 {
            self.row += 1;
            self.col = 0;
        }
    }

    fn rule(&mut self) {
        if self.col == 0 {
            match self.row.checked_sub(1) {
                Some(above) => self.rows[above].has_bottom_border = true,
                None => self.top_border = true,
            }
        } else if let Some(row) = self.rows.get_mut(self.row) {
            row.has_bottom_border = true;
        }
    }

    fn finish(mut self) -> Vec<Row> {
        let used = self
            .taken
            .iter()
            .rposition(|row| row.iter().any(|&t| t))
            .map_or(0, |last| last + 1);
        self.rows.truncate(used);
        for i in 1..self.rows.len() {
            if self.rows[i].cells.is_empty() {
                self.rows[i].section = self.rows[i - 1].section;
            }
        }
        self.rows
    }
}

// ============================================================================
// Writing
// ============================================================================

/// Convert a table to a Typst `table(...)` call
pub fn table_to_typst(table: &Table) -> String {
    let grid = Grid::build(table);
    let mut output = String::new();
    let figure = table.frame.caption.is_some();

    if figure {
        output.push_str("#figure(\n  table(\n");
    } else {
        output.push_str("#table(\n");
    }
    let indent = if figure { "    " } else { "  " };

    let widths: Vec<String> = (0..grid.width())
        .map(|c| match grid.column(c).map(|spec| &spec.width) {
            Some(ColWidth::Fixed(w)) => format!("{}fr", w),
            Some(ColWidth::Percent(p)) => format!("{}%", p),
            _ => "auto".to_string(),
        })
        .collect();
    output.push_str(&format!("{}columns: ({}),\n", indent, widths.join(", ")));

    let aligns: Vec<&str> = (0..grid.width())
        .map(|c| grid.column(c).map_or("left", |spec| spec.alignment.to_typst()))
        .collect();
    output.push_str(&format!("{}align: ({}),\n", indent, aligns.join(", ")));

    if (0..grid.width())
        .filter_map(|c| grid.column(c))
        .any(|s| s.has_left_border || s.has_right_border)
    {
        output.push_str(&format!("{}stroke: 0.5pt,\n", indent));
    }
    if table.frame.has_top_border {
        output.push_str(&format!("{}table.hline(),\n", indent));
    }

    let section = |r: usize| grid.row_meta(r).map_or(RowSection::Body, |m| m.section);
    let height = grid.height();
    let head_end = (0..height).take_while(|&r| section(r) == RowSection::Head).count();
    let foot_start = height
        - (head_end..height)
            .rev()
            .take_while(|&r| section(r) == RowSection::Foot)
            .count();

    let emit_rows = |output: &mut String, rows: std::ops::Range<usize>, indent: &str| {
        for r in rows {
            let cells: Vec<String> = grid
                .cells()
                .iter()
                .filter(|cell| cell.row == r)
                .map(|cell| cell_to_typst(&cell.data))
                .collect();
            if !cells.is_empty() {
                output.push_str(&format!("{}{},\n", indent, cells.join(", ")));
            }
            if grid.row_meta(r).is_some_and(|m| m.has_bottom_border) {
                output.push_str(&format!("{}table.hline(),\n", indent));
            }
        }
    };

    let nested = format!("{}  ", indent);
    if head_end > 0 {
        output.push_str(&format!("{}table.header(\n", indent));
        emit_rows(&mut output, 0..head_end, &nested);
        output.push_str(&format!("{}),\n", indent));
    }
    emit_rows(&mut output, head_end..foot_start, indent);
    if foot_start < height {
        output.push_str(&format!("{}table.footer(\n", indent));
        emit_rows(&mut output, foot_start..height, &nested);
        output.push_str(&format!("{}),\n", indent));
    }

    if let Some(ref caption) = table.frame.caption {
        output.push_str("  ),\n");
        output.push_str(&format!("  caption: [{}],\n", caption.long));
        output.push(')');
        if let Some(ref label) = table.frame.label {
            output.push_str(&format!(" <{}>", label));
        }
    } else {
        output.push(')');
    }

    output.push('\n');
    output
}

fn cell_to_typst(cell: &Cell) -> String {
    let mut args = Vec::new();
    if cell.colspan > 1 {
        args.push(format!("colspan: {}", cell.colspan));
    }
    if cell.rowspan > 1 {
        args.push(format!("rowspan: {}", cell.rowspan));
    }
    if let Some(alignment) = cell.alignment.filter(|a| *a != Alignment::Default) {
        args.push(format!("align: {}", alignment.to_typst()));
    }
    if args.is_empty() {
        format!("[{}]", cell.content)
    } else {
        format!("table.cell({})[{}]", args.join(", "), cell.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn layout(table: &Table) -> Vec<Vec<String>> {
        Grid::build(table)
            .layout()
            .into_iter()
            .map(|row| row.into_iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn test_parse_simple_table() {
        let table = parse_typst_table("#table(columns: 3, [A], [B], [C], [1], [2], [3])").unwrap();
        assert_eq!(table.num_cols(), 3);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].cells[2].content, "3");
    }

    #[test]
    fn test_auto_placement_skips_spans() {
        let input = "#table(columns: 3,
  table.cell(colspan: 2, rowspan: 2)[X], [a],
  [b],
  [c], [d], [e],
)";
        let table = parse_typst_table(input).unwrap();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1].cells.len(), 1);
        assert_eq!(
            layout(&table),
            vec![
                vec!["X", "X", "a"],
                vec!["X", "X", "b"],
                vec!["c", "d", "e"],
            ]
        );
    }

    #[test]
    fn test_header_and_footer() {
        let input = "#table(
  columns: (auto, 1fr),
  align: (left, center),
  table.header([H1], [H2]),
  [a], [b],
  table.hline(),
  table.footer(repeat: false, [f1], [f2]),
)";
        let table = parse_typst_table(input).unwrap();
        let sections: Vec<RowSection> = table.rows.iter().map(|r| r.section).collect();
        assert_eq!(sections, vec![RowSection::Head, RowSection::Body, RowSection::Foot]);
        assert!(table.rows[1].has_bottom_border);
        assert_eq!(table.colspecs[1].width, ColWidth::Fixed(1.0));
        assert_eq!(table.colspecs[1].alignment, Alignment::Center);
    }

    #[test]
    fn test_markup_with_brackets_and_strings() {
        let table =
            parse_typst_table(r#"#table(columns: 2, [a (b], [say "hi", ok], "plain", $x, y$)"#)
                .unwrap();
        let contents: Vec<&str> = table.rows.iter().flat_map(|r| &r.cells).map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["a (b", r#"say "hi", ok"#, r#""plain""#, "$x, y$"]);
    }

    #[test]
    fn test_write_and_reparse() {
        let mut table = Table::new(3);
        table.push_row(
            Row::with_cells(vec![Cell::new("H1"), Cell::new("H2"), Cell::new("H3")])
                .in_section(RowSection::Head),
        );
        table.push_row(Row::with_cells(vec![Cell::with_span("A", 2, 2), Cell::new("B")]));
        table.push_row(Row::with_cells(vec![Cell::new("C")]));

        let typst = table_to_typst(&table);
        assert!(typst.starts_with("#table(\n"));
        assert!(typst.contains("table.header(\n    [H1], [H2], [H3],\n  ),"));
        assert!(typst.contains("table.cell(colspan: 2, rowspan: 2)[A], [B],"));

        let reparsed = parse_typst_table(&typst).unwrap();
        assert_eq!(layout(&reparsed), layout(&table));
        assert_eq!(reparsed.rows[0].section, RowSection::Head);
    }

    #[test]
    fn test_merged_block_keeps_its_rows() {
        let mut table = Table::new(2);
        table.push_row(Row::with_cells(vec![Cell::with_span("abcd", 2, 2)]));
        table.push_row(Row::new());
        table.push_row(Row::with_cells(vec![Cell::new("e"), Cell::new("f")]));

        let reparsed = parse_typst_table(&table_to_typst(&table)).unwrap();
        assert_eq!(reparsed.rows.len(), 3);
        assert!(reparsed.rows[1].cells.is_empty());
        assert_eq!(reparsed.rows[0].cells[0].rowspan, 2);
        assert_eq!(layout(&reparsed), layout(&table));
    }

    #[test]
    fn test_figure_caption_and_label() {
        let mut table = Table::from_rows([vec!["x"]]);
        table.frame.caption = Some(Caption {
            short: None,
            long: "Results".into(),
        });
        table.frame.label = Some("tab:results".into());
        let typst = table_to_typst(&table);
        assert!(typst.starts_with("#figure(\n  table(\n"));
        assert!(typst.contains("caption: [Results]"));

        let reparsed = parse_typst_table(&typst).unwrap();
        assert_eq!(reparsed.frame.caption.unwrap().long, "Results");
        assert_eq!(reparsed.frame.label.as_deref(), Some("tab:results"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_typst_table("just text"), Err(TableError::Parse { .. })));
        let err = parse_typst_table("\n\n#table(columns: 2, [a]").unwrap_err();
        assert_eq!(
            err,
            TableError::Parse {
                message: "unclosed table(".into(),
                line: Some(3)
            }
        );
    }
}
