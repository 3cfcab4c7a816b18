//! Table row restyling.
//!
//! Cells are split on unescaped pipes and styled independently. Styling may
//! remove markup characters while adding zero-width escape sequences, so each
//! cell is padded back to its original visible width to keep columns aligned.

use textwrap::core::display_width;

/// Split a table row on pipes, keeping `\|` inside its cell.
///
/// Cell text is returned verbatim, including surrounding spaces and the
/// leading indentation before the first pipe.
#[must_use]
pub(crate) fn split_cells(line: &str) -> Vec<&str> {
    let mut cells = Vec::new();
    let mut start = 0;
    for (idx, _) in line.match_indices('|') {
        if line[start..idx].ends_with('\\') {
            continue;
        }
        cells.push(&line[start..idx]);
        start = idx + 1;
    }
    cells.push(&line[start..]);
    cells
}

fn compensate(original: &str, mut styled: String) -> String {
    let before = display_width(original);
    let after = display_width(&styled);
    if after < before {
        styled.push_str(&" ".repeat(before - after));
    }
    styled
}

/// Style every cell of `line` with `format` and reassemble the row.
pub(crate) fn format_row<F>(line: &str, format: F) -> String
where
    F: Fn(&str) -> String,
{
    split_cells(line)
        .into_iter()
        .map(|cell| compensate(cell, format(cell)))
        .collect::<Vec<_>>()
        .join("|")
}
