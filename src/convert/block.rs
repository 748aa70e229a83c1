//! Line-oriented conversion of tables and directive lines.
//!
//! The scan keeps an explicit cursor. Converters return the index of the
//! first line after whatever they consumed, so converted rows are never
//! visited twice.

use super::code_block::CODE_PLACEHOLDER;
use crate::model::{Alignment, TableAttributes};
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

static TABLE_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|\|[^|]").expect("TABLE_START: valid regex"));

static DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(:(.*?):\)").expect("DIRECTIVE: valid regex"));

static CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(:(cellnr|cell|headnr|head)\b.*?:\)(.*)$").expect("CELL: valid regex")
});

/// Convert tables and drop unhandled directive lines, in place.
pub fn process_blocks(lines: &mut Vec<String>) {
    let mut row = 0;
    while row < lines.len() {
        row = if TABLE_START.is_match(&lines[row]) {
            convert_table(lines, row)
        } else if let Some(name) = directive_name(&lines[row]) {
            if name == "table" {
                let next = lines[row + 1..].iter().find(|line| !line.trim().is_empty());
                if next.is_some_and(|line| CELL.is_match(line)) {
                    convert_directive_table(lines, row)
                } else {
                    convert_table(lines, row)
                }
            } else {
                debug!("Dropping directive line: {}", lines[row]);
                lines.remove(row);
                row
            }
        } else {
            row + 1
        };
    }
}

/// Name of a directive at the start of `line` (`(:table border=1:)` → `table`).
fn directive_name(line: &str) -> Option<String> {
    DIRECTIVE.captures(line).map(|caps| {
        caps[1]
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string()
    })
}

/// Cells of a `||a||b||` row, trimmed, with `!` header markers dropped.
fn split_row(line: &str) -> Vec<String> {
    let line = line.trim();
    let inner = line.strip_prefix("||").unwrap_or(line);
    let inner = inner.strip_suffix("||").unwrap_or(inner);

    inner
        .split("||")
        .map(|cell| {
            let cell = cell.trim();
            cell.strip_prefix('!').map_or(cell, str::trim).to_string()
        })
        .collect()
}

fn render_row(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

fn delimiter_row(alignment: Alignment, columns: usize) -> String {
    format!("| {} |", vec![alignment.delimiter(); columns].join(" | "))
}

/// A `||` line that holds only attributes, not cells.
fn is_attribute_line(line: &str) -> bool {
    line.trim()
        .strip_prefix("||")
        .is_some_and(|rest| !rest.contains("||"))
}

/// Convert a `||` table, returning the index of the first line after it.
///
/// The marker line (a `(:table:)` directive or an attribute-only `||` line)
/// is removed and its `align` attribute decides the delimiter row. When the
/// first `||` line already carries cells it is the header itself.
pub fn convert_table(lines: &mut Vec<String>, row: usize) -> usize {
    let attrs = TableAttributes::parse(&lines[row]);
    if lines[row].starts_with("(:") || is_attribute_line(&lines[row]) {
        lines.remove(row);
    }

    let Some(header) = lines.get(row) else {
        debug!("Table marker without header row");
        return row;
    };
    if !header.contains("||") {
        debug!("Table marker followed by non-table line: {}", header);
        return row;
    }

    let cells = split_row(header);
    let columns = cells.len();
    lines[row] = render_row(&cells);
    lines.insert(row + 1, delimiter_row(attrs.alignment(), columns));

    let mut next = row + 2;
    while next < lines.len() && !lines[next].is_empty() && lines[next].contains("||") {
        lines[next] = render_row(&split_row(&lines[next]));
        next += 1;
    }
    next
}

/// Convert a `(:table:)`…`(:tableend:)` region built from cell directives.
///
/// `(:head:)` cells before any body row form the header; `(:cellnr:)` and
/// `(:headnr:)` open a new row; plain lines continue the last cell.
/// Extracted code lines found inside are moved below the table.
pub fn convert_directive_table(lines: &mut Vec<String>, start: usize) -> usize {
    let attrs = TableAttributes::parse(&lines[start]);
    let mut header: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut moved = Vec::new();

    let mut end = start + 1;
    while end < lines.len() {
        let line = &lines[end];
        end += 1;

        if directive_name(line).as_deref() == Some("tableend") {
            break;
        }
        if line == CODE_PLACEHOLDER {
            moved.push(line.clone());
            continue;
        }

        let Some(caps) = CELL.captures(line) else {
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            let last = rows
                .last_mut()
                .and_then(|row| row.last_mut())
                .or_else(|| header.last_mut());
            match last {
                Some(cell) if cell.is_empty() => cell.push_str(text),
                Some(cell) => {
                    cell.push(' ');
                    cell.push_str(text);
                }
                None => rows.push(vec![text.to_string()]),
            }
            continue;
        };

        let text = caps[2].trim().to_string();
        match &caps[1] {
            "head" if rows.is_empty() => header.push(text),
            "head" => push_cell(&mut rows, bold(text)),
            "headnr" => rows.push(vec![bold(text)]),
            "cellnr" => rows.push(vec![text]),
            _ => push_cell(&mut rows, text),
        }
    }

    if header.is_empty() && !rows.is_empty() {
        header = rows.remove(0);
    }

    let columns = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0)
        .max(1);
    header.resize(columns, String::new());
    for row in &mut rows {
        row.resize(columns, String::new());
    }

    let mut out = Vec::with_capacity(rows.len() + 2 + moved.len());
    out.push(render_row(&header));
    out.push(delimiter_row(attrs.alignment(), columns));
    out.extend(rows.iter().map(|row| render_row(row)));
    out.extend(moved);

    let next = start + out.len();
    lines.splice(start..end, out);
    next
}

fn push_cell(rows: &mut Vec<Vec<String>>, text: String) {
    match rows.last_mut() {
        Some(row) => row.push(text),
        None => rows.push(vec![text]),
    }
}

fn bold(text: String) -> String {
    if text.is_empty() {
        text
    } else {
        format!("**{}**", text)
    }
}
