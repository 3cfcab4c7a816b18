//! HTML comment handling.
//!
//! A comment only spans lines when its opener starts the line and the line
//! has no closer after it. Anything else is treated as inline comments and
//! stripped from the line.

pub(crate) const OPEN: &str = "<!--";
pub(crate) const CLOSE: &str = "-->";

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Comment {
    /// The line opens a multi-line comment.
    Opened,
    /// Inline comments were removed; the remainder is returned.
    Stripped(String),
}

/// Classify a line containing [`OPEN`].
pub(crate) fn strip(line: &str) -> Comment {
    if line.trim_start().starts_with(OPEN) {
        let opener = line.find(OPEN).unwrap_or_default();
        if !line[opener + OPEN.len()..].contains(CLOSE) {
            return Comment::Opened;
        }
    }

    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(start) = rest.find(OPEN) {
        let after = &rest[start + OPEN.len()..];
        let Some(end) = after.find(CLOSE) else {
            break;
        };
        out.push_str(&rest[..start]);
        rest = &after[end + CLOSE.len()..];
    }
    out.push_str(rest);
    Comment::Stripped(out)
}

/// Return the text after the closing delimiter, if the line has one.
pub(crate) fn close(line: &str) -> Option<&str> {
    line.find(CLOSE).map(|idx| &line[idx + CLOSE.len()..])
}
