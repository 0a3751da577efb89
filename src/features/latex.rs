//! LaTeX `tabular` reading and writing
//!
//! Handles `tabular`, `tabularx` and `longtable` bodies with `\multicolumn`
//! and `\multirow`. LaTeX repeats a placeholder cell at every position that
//! a `\multirow` covers from above; the reader drops those placeholders and
//! the writer emits them again, so the physical model only ever holds the
//! cells anchored in each row.

use std::ops::Range;

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::core::grid::{Grid, Slot};
use crate::document::{Alignment, Caption, Cell, ColSpec, ColWidth, Row, RowSection, Table};
use crate::utils::error::{TableError, TableResult};

lazy_static! {
    // Rules and longtable markers that may lead a row
    static ref LEADING_RULE: Regex = Regex::new(
        r"^\\(?:hline|toprule|midrule|bottomrule|cline\s*\{[^}]*\}|cmidrule\s*(?:\([^)]*\))?\s*\{[^}]*\})"
    ).unwrap();
    static ref LONGTABLE_MARKER: Regex = Regex::new(r"^\\(endfirsthead|endhead|endfoot|endlastfoot)\b").unwrap();
    // Optional spacing after a row end: \\[2pt]
    static ref ROW_SPACING: Regex = Regex::new(r"^\s*\[[^\]]*\]").unwrap();
}

const ENVIRONMENTS: [&str; 3] = ["tabularx", "longtable", "tabular"];

// ============================================================================
// Parsing
// ============================================================================

/// Parse the first tabular environment in `input`
pub fn parse_latex_table(input: &str) -> TableResult<Table> {
    let (env, begin) = ENVIRONMENTS
        .iter()
        .find_map(|env| {
            input
                .find(&format!("\\begin{{{}}}", env))
                .map(|pos| (*env, pos))
        })
        .ok_or_else(|| TableError::parse("no tabular environment found"))?;

    let after_begin = &input[begin + env.len() + "\\begin{}".len()..];
    let (colspecs, body) = split_column_spec(after_begin, env).ok_or_else(|| {
        TableError::parse_at("unterminated column specification", line_of(input, begin))
    })?;
    if colspecs.is_empty() {
        return Err(TableError::parse_at(
            "column specification declares no columns",
            line_of(input, begin),
        ));
    }
    let end_marker = format!("\\end{{{}}}", env);
    let body_end = body.find(&end_marker).ok_or_else(|| {
        TableError::parse_at(format!("missing {}", end_marker), line_of(input, begin))
    })?;

    let mut table = Table::new(colspecs.len());
    table.colspecs = colspecs;
    table.frame.caption = extract_caption(input);
    table.frame.label = extract_label(input);

    let mut reader = RowReader::default();
    for chunk in split_top_level(&body[..body_end], Separator::RowEnd) {
        reader.feed(&chunk);
    }
    reader.finish(&mut table);
    debug!(
        "parsed {} with {} row(s) and {} column(s)",
        env,
        table.rows.len(),
        table.num_cols()
    );
    Ok(table)
}

fn line_of(input: &str, byte: usize) -> usize {
    input[..byte].matches('\n').count() + 1
}

/// Split `{spec}` (after the optional width argument of tabularx) from the
/// environment body
fn split_column_spec<'a>(after_begin: &'a str, env: &str) -> Option<(Vec<ColSpec>, &'a str)> {
    let mut rest = after_begin.trim_start();
    // Optional position argument: \begin{tabular}[t]{...}
    if rest.starts_with('[') {
        rest = &rest[rest.find(']')? + 1..];
    }
    if env == "tabularx" {
        let (_, after_width) = take_group(rest)?;
        rest = after_width;
    }
    let (spec, body) = take_group(rest)?;
    Some((parse_colspecs(spec), body))
}

/// Parse column specification characters
fn parse_colspecs(spec: &str) -> Vec<ColSpec> {
    let mut colspecs: Vec<ColSpec> = Vec::new();
    let mut has_left_border = false;
    let mut rest = spec;

    while let Some(c) = rest.chars().next() {
        rest = &rest[c.len_utf8()..];
        match c {
            '|' => {
                if colspecs.is_empty() {
                    has_left_border = true;
                } else if let Some(last) = colspecs.last_mut() {
                    last.has_right_border = true;
                }
            }
            'l' | 'c' | 'r' | 'p' | 'm' | 'b' | 'X' => {
                let mut spec = ColSpec {
                    alignment: Alignment::from_latex_char(c),
                    has_left_border,
                    ..Default::default()
                };
                if matches!(c, 'p' | 'm' | 'b') {
                    if let Some((_, after)) = take_group(rest) {
                        rest = after;
                    }
                    spec.alignment = Alignment::Left;
                } else if c == 'X' {
                    spec.alignment = Alignment::Left;
                    spec.width = ColWidth::Fixed(1.0);
                }
                has_left_border = false;
                colspecs.push(spec);
            }
            '*' => {
                // *{n}{spec}
                let Some((count, after)) = take_group(rest) else {
                    continue;
                };
                let Some((repeated, after)) = take_group(after) else {
                    continue;
                };
                rest = after;
                let count: usize = count.trim().parse().unwrap_or(0);
                for _ in 0..count {
                    let mut expanded = parse_colspecs(repeated);
                    if let Some(first) = expanded.first_mut() {
                        first.has_left_border |= has_left_border;
                        has_left_border = false;
                    }
                    if expanded.is_empty() && repeated.contains('|') {
                        if let Some(last) = colspecs.last_mut() {
                            last.has_right_border = true;
                        }
                    }
                    colspecs.append(&mut expanded);
                }
            }
            '@' | '>' | '<' | '!' => {
                if let Some((_, after)) = take_group(rest) {
                    rest = after;
                }
            }
            _ => {}
        }
    }

    colspecs
}

/// Take a leading `{...}` group; returns (inner, rest)
fn take_group(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if !s.starts_with('{') {
        return None;
    }
    let end = find_matching_brace(s)?;
    Some((&s[1..end], &s[end + 1..]))
}

/// Skip a leading `[...]` optional argument
fn skip_optional(s: &str) -> &str {
    let trimmed = s.trim_start();
    if trimmed.starts_with('[') {
        if let Some(end) = trimmed.find(']') {
            return &trimmed[end + 1..];
        }
    }
    s
}

/// Find the position of the matching closing brace
fn find_matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn extract_caption(input: &str) -> Option<Caption> {
    let start = input.find("\\caption")?;
    let rest = input[start + "\\caption".len()..].trim_start();

    let (short, rest) = match rest.strip_prefix('[') {
        Some(inner) => {
            let end = inner.find(']')?;
            (Some(inner[..end].to_string()), &inner[end + 1..])
        }
        None => (None, rest),
    };
    let (long, _) = take_group(rest)?;
    Some(Caption {
        short,
        long: long.to_string(),
    })
}

fn extract_label(input: &str) -> Option<String> {
    let start = input.find("\\label")?;
    let (label, _) = take_group(&input[start + "\\label".len()..])?;
    Some(label.to_string())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Separator {
    RowEnd,
    Cell,
}

/// Split at top-level `\\` or `&`, honoring braces and escapes
fn split_top_level(s: &str, separator: Separator) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut chars = s.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.peek().map(|&(_, next)| next) {
                Some('\\') if depth == 0 && separator == Separator::RowEnd => {
                    chars.next();
                    parts.push(std::mem::take(&mut current));
                    // Drop \\[2pt] spacing
                    let after = &s[i + 2..];
                    if let Some(m) = ROW_SPACING.find(after) {
                        let skip_to = i + 2 + m.end();
                        while chars.peek().is_some_and(|&(j, _)| j < skip_to) {
                            chars.next();
                        }
                    }
                }
                Some(next) => {
                    chars.next();
                    current.push(c);
                    current.push(next);
                }
                None => current.push(c),
            },
            '{' => {
                depth += 1;
                current.push(c);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            '&' if depth == 0 && separator == Separator::Cell => {
                parts.push(std::mem::take(&mut current));
            }
            '%' => {
                // Comment to end of line
                while chars.peek().is_some_and(|&(_, next)| next != '\n') {
                    chars.next();
                }
            }
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

/// Assembles physical rows, dropping multirow placeholders
#[derive(Default)]
struct RowReader {
    rows: Vec<Row>,
    /// Rows still covered below, per column
    coverage: Vec<usize>,
    top_border: bool,
    head_rows: Option<usize>,
    /// Rows declared before `\endfoot`
    foot: Option<Range<usize>>,
    last_marker: usize,
}

impl RowReader {
    fn feed(&mut self, chunk: &str) {
        let mut text = chunk.trim();
        loop {
            if let Some(m) = LEADING_RULE.find(text) {
                match self.rows.last_mut() {
                    Some(row) => row.has_bottom_border = true,
                    None => self.top_border = true,
                }
                text = text[m.end()..].trim_start();
            } else if let Some(caps) = LONGTABLE_MARKER.captures(text) {
                let count = self.rows.len();
                match &caps[1] {
                    "endfirsthead" | "endhead" => {
                        self.head_rows.get_or_insert(count);
                    }
                    _ => {
                        let start = self.last_marker;
                        self.foot.get_or_insert(start..count);
                    }
                }
                self.last_marker = count;
                text = text[caps.get(0).map_or(0, |m| m.end())..].trim_start();
            } else {
                break;
            }
        }
        if text.is_empty() {
            // A row whose only position is spanned from above
            if self.coverage.iter().any(|&n| n > 0) {
                self.push_row(Vec::new());
            }
            return;
        }
        let raw_cells = split_top_level(text, Separator::Cell);
        self.push_row(raw_cells);
    }

    fn push_row(&mut self, raw_cells: Vec<String>) {
        let covered: Vec<bool> = self.coverage.iter().map(|&n| n > 0).collect();
        for n in self.coverage.iter_mut() {
            *n = n.saturating_sub(1);
        }

        let mut row = Row::new();
        let mut col = 0;
        for raw in raw_cells {
            let cell = parse_cell(&raw);
            if covered.get(col).copied().unwrap_or(false) && cell.is_empty() {
                col += cell.colspan.max(1);
                continue;
            }
            let span = cell.colspan.max(1);
            if self.coverage.len() < col + span {
                self.coverage.resize(col + span, 0);
            }
            for n in &mut self.coverage[col..col + span] {
                *n = cell.rowspan.saturating_sub(1);
            }
            col += span;
            row.push(cell);
        }
        self.rows.push(row);
    }

    fn finish(self, table: &mut Table) {
        let count = self.rows.len();
        let head = match self.head_rows {
            Some(n) => n,
            // A rule under the first row marks it as the header
            None if count > 1 && self.rows[0].has_bottom_border => 1,
            None => 0,
        };
        let foot = self.foot.filter(|range| !range.is_empty());
        let mut footer = Vec::new();
        for (i, mut row) in self.rows.into_iter().enumerate() {
            if foot.as_ref().is_some_and(|range| range.contains(&i)) {
                // longtable declares the foot up front; it belongs at the end
                row.section = RowSection::Foot;
                footer.push(row);
                continue;
            }
            if i < head {
                row.section = RowSection::Head;
            }
            table.push_row(row);
        }
        for row in footer {
            table.push_row(row);
        }
        table.frame.has_top_border = self.top_border;
    }
}

/// Parse a single cell, handling multicolumn/multirow
fn parse_cell(raw: &str) -> Cell {
    let content = raw.trim();
    if let Some(rest) = content.strip_prefix("\\multicolumn") {
        if let Some(cell) = parse_multicolumn(rest) {
            return cell;
        }
    }
    if let Some(rest) = content.strip_prefix("\\multirow") {
        if let Some(cell) = parse_multirow(rest) {
            return cell;
        }
    }
    Cell::new(content)
}

/// `{n}{align}{content}`, content may itself be a `\multirow`
fn parse_multicolumn(rest: &str) -> Option<Cell> {
    let (count, rest) = take_group(rest)?;
    let (align, rest) = take_group(rest)?;
    let (content, _) = take_group(rest)?;

    let mut cell = parse_cell(content);
    cell.colspan = count.trim().parse().unwrap_or(1);
    cell.alignment = align
        .chars()
        .find(|c| "lcr".contains(*c))
        .map(Alignment::from_latex_char);
    Some(cell)
}

/// `[vpos]{n}[bigstruts]{width}[fixup]{content}`
fn parse_multirow(rest: &str) -> Option<Cell> {
    let (count, rest) = take_group(skip_optional(rest))?;
    let (_, rest) = take_group(skip_optional(rest))?;
    let (content, _) = take_group(skip_optional(rest))?;

    let mut cell = Cell::new(content.trim());
    cell.rowspan = count.trim().parse().unwrap_or(1);
    Some(cell)
}

// ============================================================================
// Writing
// ============================================================================

/// Convert a table to a LaTeX `tabular`
pub fn table_to_latex(table: &Table) -> String {
    let grid = Grid::build(table);
    let mut output = String::new();

    if table.frame.caption.is_some() {
        output.push_str("\\begin{table}[htbp]\n");
        output.push_str("\\centering\n");
    }

    let col_spec: String = (0..grid.width())
        .map(|c| column_spec(grid.column(c)))
        .collect();
    output.push_str(&format!("\\begin{{tabular}}{{{}}}\n", col_spec));

    if table.frame.has_top_border {
        output.push_str("\\hline\n");
    }

    let last_head = (0..grid.height())
        .take_while(|&r| grid.row_meta(r).is_some_and(|m| m.section == RowSection::Head))
        .last();
    for r in 0..grid.height() {
        output.push_str(&row_to_latex(&grid, r));
        let bordered = grid.row_meta(r).is_some_and(|m| m.has_bottom_border);
        if bordered || Some(r) == last_head {
            output.push_str("\\hline\n");
        }
    }

    output.push_str("\\end{tabular}\n");

    if let Some(ref caption) = table.frame.caption {
        if let Some(ref short) = caption.short {
            output.push_str(&format!("\\caption[{}]{{{}}}\n", short, caption.long));
        } else {
            output.push_str(&format!("\\caption{{{}}}\n", caption.long));
        }
    }
    if let Some(ref label) = table.frame.label {
        output.push_str(&format!("\\label{{{}}}\n", label));
    }
    if table.frame.caption.is_some() {
        output.push_str("\\end{table}\n");
    }

    output
}

fn column_spec(spec: Option<&ColSpec>) -> String {
    let spec = spec.cloned().unwrap_or_default();
    let mut s = String::new();
    if spec.has_left_border {
        s.push('|');
    }
    match spec.width {
        ColWidth::Fixed(_) => s.push('X'),
        _ => s.push(spec.alignment.to_latex_char()),
    }
    if spec.has_right_border {
        s.push('|');
    }
    s
}

/// One row, with placeholders where a multirow covers it from above
fn row_to_latex(grid: &Grid, row: usize) -> String {
    let mut cells = Vec::new();
    let mut col = 0;
    while col < grid.width() {
        let Some(slot) = grid.slot(row, col) else {
            break;
        };
        let cell = grid.cell(slot.id());
        let alignment = cell
            .data
            .alignment
            .or_else(|| grid.column(col).map(|c| c.alignment))
            .unwrap_or_default();
        match slot {
            Slot::Anchor(_) => cells.push(cell_to_latex(&cell.data, alignment)),
            Slot::Spanned(_) if cell.row < row && cell.col == col => {
                if cell.colspan() > 1 {
                    cells.push(format!(
                        "\\multicolumn{{{}}}{{{}}}{{}}",
                        cell.colspan(),
                        alignment.to_latex_char()
                    ));
                } else {
                    cells.push(String::new());
                }
            }
            Slot::Spanned(_) => {}
        }
        col = cell.col + cell.colspan();
    }
    format!("{} \\\\\n", cells.join(" & "))
}

fn cell_to_latex(cell: &Cell, alignment: Alignment) -> String {
    let content = if cell.rowspan > 1 {
        format!("\\multirow{{{}}}{{*}}{{{}}}", cell.rowspan, cell.content)
    } else {
        cell.content.clone()
    };
    if cell.colspan > 1 {
        format!(
            "\\multicolumn{{{}}}{{{}}}{{{}}}",
            cell.colspan,
            alignment.to_latex_char(),
            content
        )
    } else {
        content
    }
}
