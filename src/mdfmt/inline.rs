//! Inline construct substitution.
//!
//! Each pass walks the text left to right and splits it into [`Segment`]s.
//! Substituted output becomes [`Segment::Done`] so later passes never look
//! inside it. Pass order is links, inline code, bold, then italic.

use std::ops::Range;

use super::Formatter;

/// A run of text produced by a substitution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    /// Text still open to later passes.
    Text(String),
    /// Output of a substitution, emitted untouched.
    Done(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Emphasis {
    Bold,
    Italic,
}

impl Emphasis {
    fn delimiters(self) -> [&'static str; 2] {
        match self {
            Self::Bold => ["**", "__"],
            Self::Italic => ["*", "_"],
        }
    }

    fn apply<F: Formatter + ?Sized>(self, style: &F, inner: &str) -> Option<String> {
        match self {
            Self::Bold => style.bold(inner),
            Self::Italic => style.italic(inner),
        }
    }
}

/// Run every non-header pass over `text`.
pub(crate) fn format_inline<F: Formatter + ?Sized>(text: &str, style: &F) -> String {
    finish(links(text, style), style)
}

/// Run the passes that follow link substitution and join the result.
pub(crate) fn finish<F: Formatter + ?Sized>(segments: Vec<Segment>, style: &F) -> String {
    let segments = code_spans(segments, style);
    let segments = emphasis(segments, Emphasis::Bold, style);
    let segments = emphasis(segments, Emphasis::Italic, style);
    concat(&segments)
}

pub(crate) fn concat(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text(s) | Segment::Done(s) => out.push_str(s),
        }
    }
    out
}

fn push_text(out: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Text(last)) = out.last_mut() {
        last.push_str(text);
    } else {
        out.push(Segment::Text(text.to_string()));
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn char_len_at(text: &str, idx: usize) -> usize {
    text[idx..].chars().next().map_or(1, char::len_utf8)
}

/// Find the closing backtick run for the run starting at `start`.
///
/// Returns the opening run length and the index of the closing run, if any.
fn match_code_span(text: &str, start: usize) -> (usize, Option<usize>) {
    let bytes = text.as_bytes();
    let run = super::location::backtick_run(&text[start..]);
    let mut i = start + run;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let close = super::location::backtick_run(&text[i..]);
            if close == run {
                return (run, Some(i));
            }
            i += close;
        } else {
            i += 1;
        }
    }
    (run, None)
}

/// Parse `[label](url)` starting at the `[` at `start`.
///
/// Returns the label, the url and the index one past the closing `)`.
fn parse_link(text: &str, start: usize) -> Option<(&str, &str, usize)> {
    let rest = &text[start + 1..];
    let close = rest.find(']')?;
    let label = &rest[..close];
    // A later `[` starts the real label; this one is literal.
    if label.contains('[') {
        return None;
    }
    let url_part = rest[close + 1..].strip_prefix('(')?;
    let url_start = start + 1 + close + 2;
    let mut depth = 1;
    for (idx, ch) in url_part.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((label, &url_part[..idx], url_start + idx + 1));
                }
            }
            _ => {}
        }
    }
    None
}

/// Substitute `[text](url)` links. Code spans are skipped.
pub(crate) fn links<F: Formatter + ?Sized>(text: &str, style: &F) -> Vec<Segment> {
    let mut out = Vec::new();
    let bytes = text.as_bytes();
    let mut plain_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'`' => match match_code_span(text, i) {
                (run, Some(close)) => i = close + run,
                (run, None) => i += run,
            },
            b'[' => {
                if let Some((label, url, end)) = parse_link(text, i)
                    && let Some(styled) = style.link(label, url)
                {
                    push_text(&mut out, &text[plain_start..i]);
                    out.push(Segment::Done(styled));
                    plain_start = end;
                    i = end;
                    continue;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    push_text(&mut out, &text[plain_start..]);
    out
}

/// Substitute inline code spans. Spans are protected even when unstyled.
pub(crate) fn code_spans<F: Formatter + ?Sized>(segments: Vec<Segment>, style: &F) -> Vec<Segment> {
    let mut out = Vec::with_capacity(segments.len());
    for segment in segments {
        let text = match segment {
            Segment::Text(text) => text,
            done @ Segment::Done(_) => {
                out.push(done);
                continue;
            }
        };
        let bytes = text.as_bytes();
        let mut plain_start = 0;
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] != b'`' {
                i += 1;
                continue;
            }
            let (run, close) = match_code_span(&text, i);
            let Some(close) = close else {
                i += run;
                continue;
            };
            push_text(&mut out, &text[plain_start..i]);
            let inner = &text[i + run..close];
            let styled = style
                .code(inner)
                .unwrap_or_else(|| text[i..close + run].to_string());
            out.push(Segment::Done(styled));
            i = close + run;
            plain_start = i;
        }
        push_text(&mut out, &text[plain_start..]);
    }
    out
}

/// Segments joined into one string, with a mask of the bytes still open to
/// substitution.
///
/// Emphasis may enclose earlier output, so delimiters are matched across
/// [`Segment::Done`] runs while the runs themselves stay opaque.
struct Flat {
    text: String,
    open: Vec<bool>,
}

impl Flat {
    fn new(segments: Vec<Segment>) -> Self {
        let mut text = String::new();
        let mut open = Vec::new();
        for segment in segments {
            let (s, is_open) = match segment {
                Segment::Text(s) => (s, true),
                Segment::Done(s) => (s, false),
            };
            open.resize(open.len() + s.len(), is_open);
            text.push_str(&s);
        }
        Self { text, open }
    }

    fn is_open(&self, range: Range<usize>) -> bool {
        self.open[range].iter().all(|&o| o)
    }

    /// Whether an open delimiter `delim` starts at `idx`.
    fn delim_at(&self, idx: usize, delim: &str) -> bool {
        self.text[idx..].starts_with(delim) && self.is_open(idx..idx + delim.len())
    }

    /// The open-text character ending at `idx`; done output counts as a boundary.
    fn char_before(&self, idx: usize) -> Option<char> {
        let c = self.text[..idx].chars().next_back()?;
        self.open[idx - c.len_utf8()].then_some(c)
    }

    fn char_at(&self, idx: usize) -> Option<char> {
        let c = self.text[idx..].chars().next()?;
        self.open[idx].then_some(c)
    }

    /// Append `range` to `out`, keeping open and done runs apart.
    fn push_range(&self, out: &mut Vec<Segment>, range: Range<usize>) {
        let mut start = range.start;
        while start < range.end {
            let is_open = self.open[start];
            let end = (start..range.end)
                .find(|&i| self.open[i] != is_open)
                .unwrap_or(range.end);
            let run = &self.text[start..end];
            if is_open {
                push_text(out, run);
            } else {
                out.push(Segment::Done(run.to_string()));
            }
            start = end;
        }
    }
}

/// Locate the closer for a delimiter opening at `open`, honouring word boundaries.
fn find_closer(flat: &Flat, open: usize, delim: &str) -> Option<usize> {
    let marker = char::from(delim.as_bytes()[0]);
    let blocks = |c: char| is_word_char(c) || c == marker;
    if flat.char_before(open).is_some_and(blocks) {
        return None;
    }
    let body_start = open + delim.len();
    let close = flat.text[body_start..]
        .char_indices()
        .map(|(idx, _)| body_start + idx)
        .find(|&idx| flat.delim_at(idx, delim))?;
    let inner = &flat.text[body_start..close];
    if inner.is_empty()
        || inner.starts_with(char::is_whitespace)
        || inner.ends_with(char::is_whitespace)
    {
        return None;
    }
    if flat.char_at(close + delim.len()).is_some_and(blocks) {
        return None;
    }
    Some(close)
}

/// Substitute bold or italic spans. A span may enclose earlier output but
/// never starts or ends inside it.
pub(crate) fn emphasis<F: Formatter + ?Sized>(
    segments: Vec<Segment>,
    kind: Emphasis,
    style: &F,
) -> Vec<Segment> {
    let flat = Flat::new(segments);
    let text = flat.text.as_str();
    let mut out = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;
    while i < text.len() {
        let Some(delim) = kind
            .delimiters()
            .into_iter()
            .find(|d| flat.delim_at(i, d))
        else {
            i += char_len_at(text, i);
            continue;
        };
        if let Some(close) = find_closer(&flat, i, delim)
            && let Some(styled) = kind.apply(style, &text[i + delim.len()..close])
        {
            flat.push_range(&mut out, plain_start..i);
            out.push(Segment::Done(styled));
            i = close + delim.len();
            plain_start = i;
            continue;
        }
        i += 1;
    }
    flat.push_range(&mut out, plain_start..text.len());
    out
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    struct Tags;

    impl Formatter for Tags {
        fn link(&self, text: &str, url: &str) -> Option<String> {
            Some(format!("<{text}|{url}>"))
        }

        fn code(&self, code: &str) -> Option<String> {
            Some(format!("<c>{code}</c>"))
        }

        fn bold(&self, text: &str) -> Option<String> {
            Some(format!("<b>{text}</b>"))
        }

        fn italic(&self, text: &str) -> Option<String> {
            Some(format!("<i>{text}</i>"))
        }
    }

    #[rstest]
    #[case("_italic text_", "<i>italic text</i>")]
    #[case("_snake_case_name_", "_snake_case_name_")]
    #[case("call snake_case_identifiers now", "call snake_case_identifiers now")]
    #[case("*star* and _under_", "<i>star</i> and <i>under</i>")]
    #[case("**bold** and __strong__", "<b>bold</b> and <b>strong</b>")]
    #[case("a * b * c", "a * b * c")]
    #[case("2*3*4", "2*3*4")]
    #[case("***", "***")]
    #[case("(_x_)", "(<i>x</i>)")]
    fn emphasis_respects_word_boundaries(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(format_inline(input, &Tags), expected);
    }

    #[test]
    fn code_span_is_not_rescanned() {
        assert_eq!(
            format_inline("`**not bold**` then **bold**", &Tags),
            "<c>**not bold**</c> then <b>bold</b>"
        );
    }

    #[test]
    fn double_backtick_span_keeps_inner_backtick() {
        assert_eq!(format_inline("``a`b``", &Tags), "<c>a`b</c>");
    }

    #[test]
    fn unmatched_backtick_is_literal() {
        assert_eq!(format_inline("a ` b **c**", &Tags), "a ` b <b>c</b>");
    }

    #[test]
    fn link_url_is_protected_from_emphasis() {
        assert_eq!(
            format_inline("see [docs](http://x/_a_b_) _now_", &Tags),
            "see <docs|http://x/_a_b_> <i>now</i>"
        );
    }

    #[test]
    fn link_with_nested_parentheses() {
        assert_eq!(
            format_inline("[wiki](https://en.wikipedia.org/wiki/Rust_(language))", &Tags),
            "<wiki|https://en.wikipedia.org/wiki/Rust_(language)>"
        );
    }

    #[test]
    fn links_inside_code_spans_are_ignored() {
        assert_eq!(format_inline("`[a](b)`", &Tags), "<c>[a](b)</c>");
    }

    #[rstest]
    #[case("*a **b** c*", "<i>a <b>b</b> c</i>")]
    #[case("_see `x` here_", "<i>see <c>x</c> here</i>")]
    #[case("**use [docs](u) now**", "<b>use <docs|u> now</b>")]
    #[case("`_`x`_`", "<c>_</c>x<c>_</c>")]
    fn emphasis_encloses_earlier_output(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(format_inline(input, &Tags), expected);
    }

    #[test]
    fn stray_bracket_before_link_is_literal() {
        assert_eq!(format_inline("[[a](b)", &Tags), "[<a|b>");
    }

    #[test]
    fn bold_output_is_not_reprocessed_for_italics() {
        assert_eq!(format_inline("**_x_**", &Tags), "<b>_x_</b>");
    }

    #[test]
    fn unstyled_code_span_stays_protected() {
        struct BoldOnly;
        impl Formatter for BoldOnly {
            fn bold(&self, text: &str) -> Option<String> {
                Some(text.to_uppercase())
            }
        }
        assert_eq!(format_inline("`**x**` **y**", &BoldOnly), "`**x**` Y");
    }

    #[test]
    fn multibyte_text_is_walked_safely() {
        assert_eq!(format_inline("naïve _café_ ✓", &Tags), "naïve <i>café</i> ✓");
    }
}
