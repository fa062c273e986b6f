//! Word wrapping for styled transcript lines.
//!
//! The transcript is wrapped here and drawn by a `Paragraph` without its own
//! wrapping, so every returned line is exactly one screen row and scroll
//! limits can be computed from `Vec::len`.

use ratatui::{
    style::Style,
    text::{Line, Span},
};
use unicode_width::UnicodeWidthChar;

/// Wrap every line to at most `width` columns.
pub fn wrap_lines(lines: &[Line<'static>], width: u16) -> Vec<Line<'static>> {
    let width = usize::from(width.max(1));
    lines.iter().flat_map(|line| wrap_line(line, width)).collect()
}

type Cell = (char, Style);

/// Break at whitespace where possible; words wider than a row are split.
/// Whitespace at a wrap point is dropped, leading indentation is kept.
fn wrap_line(line: &Line<'static>, width: usize) -> Vec<Line<'static>> {
    let cells: Vec<Cell> = line
        .spans
        .iter()
        .flat_map(|span| {
            let style = line.style.patch(span.style);
            span.content.chars().map(move |ch| (ch, style))
        })
        .collect();

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    let mut row: Vec<Cell> = Vec::new();
    let mut row_width = 0usize;

    for token in tokens(&cells) {
        let token_width = cells_width(token);
        let is_space = token[0].0.is_whitespace();

        if row_width + token_width <= width {
            if !(is_space && row.is_empty() && !rows.is_empty()) {
                row.extend_from_slice(token);
                row_width += token_width;
            }
            continue;
        }

        if is_space {
            if !row.is_empty() {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }
            continue;
        }

        if token_width <= width && !row.is_empty() {
            trim_trailing_space(&mut row);
            rows.push(std::mem::take(&mut row));
            row.extend_from_slice(token);
            row_width = token_width;
            continue;
        }

        for &cell in token {
            let cell_width = cell.0.width().unwrap_or(0);
            if row_width + cell_width > width && !row.is_empty() {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }
            row.push(cell);
            row_width += cell_width;
        }
    }

    if !row.is_empty() || rows.is_empty() {
        rows.push(row);
    }
    rows.into_iter().map(cells_to_line).collect()
}

/// Split into alternating runs of whitespace and non-whitespace.
fn tokens(cells: &[Cell]) -> Vec<&[Cell]> {
    let mut out = Vec::new();
    let mut start = 0;
    for index in 1..=cells.len() {
        let boundary = index == cells.len()
            || cells[index].0.is_whitespace() != cells[start].0.is_whitespace();
        if boundary {
            out.push(&cells[start..index]);
            start = index;
        }
    }
    out
}

fn cells_width(cells: &[Cell]) -> usize {
    cells.iter().map(|(ch, _)| ch.width().unwrap_or(0)).sum()
}

fn trim_trailing_space(row: &mut Vec<Cell>) {
    while row.last().is_some_and(|(ch, _)| ch.is_whitespace()) {
        row.pop();
    }
}

fn cells_to_line(row: Vec<Cell>) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut text = String::new();
    let mut current: Option<Style> = None;
    for (ch, style) in row {
        if current.is_some_and(|s| s != style) {
            spans.push(Span::styled(std::mem::take(&mut text), current.unwrap_or_default()));
        }
        current = Some(style);
        text.push(ch);
    }
    if let Some(style) = current {
        spans.push(Span::styled(text, style));
    }
    Line::from(spans)
}
