//! Text frame of the dashboard.
//!
//! [`render`] is a pure function of the source list, the selection, the
//! buffers and the footer line. The same inputs always produce the same
//! frame.

use crate::buffer::BufferStore;
use crate::source::SourceId;
use feedboard_widgets::MultiSelection;
use std::collections::HashSet;
use std::fmt::Write;
use unicode_width::UnicodeWidthStr;

/// Narrowest message block, in columns between the side borders.
pub const MIN_BLOCK_WIDTH: usize = 33;

/// Render the whole frame as text, one `\n`-terminated line per row.
pub fn render(
    sources: &[SourceId],
    selection: &MultiSelection,
    buffers: &BufferStore,
    footer: &str,
) -> String {
    let mut out = String::from("Select Channel\n\n");

    for (index, source) in sources.iter().enumerate() {
        let cursor = if index == selection.cursor() { '>' } else { ' ' };
        let mark = if selection.is_selected(index) { 'x' } else { ' ' };
        let _ = writeln!(out, "{cursor} [{mark}] {}", sanitize(source.as_str()));
    }

    out.push_str("\nLast messages:\n");
    let chosen: HashSet<&SourceId> = selection.selected().filter_map(|i| sources.get(i)).collect();
    for (source, buffer) in buffers.iter().filter(|(id, _)| chosen.contains(id)) {
        let mut lines = vec![format!("{}:", sanitize(source.as_str()))];
        lines.extend(buffer.iter().map(sanitize));
        block(&mut out, &lines);
    }

    let _ = writeln!(out, "\n{}", sanitize(footer));
    out
}

fn block(out: &mut String, lines: &[String]) {
    let width = lines
        .iter()
        .map(|line| line.width())
        .max()
        .unwrap_or(0)
        .max(MIN_BLOCK_WIDTH);
    let border = format!("+{}+\n", "-".repeat(width + 2));

    out.push_str(&border);
    for line in lines {
        let pad = width - line.width();
        let _ = writeln!(out, "| {line}{} |", " ".repeat(pad));
    }
    out.push_str(&border);
}

/// Drop control characters; tabs become a single space.
fn sanitize(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}
