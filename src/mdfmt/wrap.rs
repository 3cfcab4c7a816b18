//! Column wrapping for formatted lines.
//!
//! Width is measured with `textwrap`, which skips ANSI escape sequences, so
//! styled lines wrap on their visible width.

use std::borrow::Cow;

use textwrap::{Options, WordSeparator, WordSplitter, WrapAlgorithm, core::display_width};

use super::location::leading_whitespace;

/// Wrap `line` to `width` columns, breaking on spaces only.
///
/// The first line keeps its own indentation; continuation lines start with
/// `continuation`. Words longer than `width` are never split.
pub(crate) fn wrap_line(line: &str, width: usize, continuation: &str) -> Vec<String> {
    if width == 0 || display_width(line) <= width {
        return vec![line.to_string()];
    }
    let indent = leading_whitespace(line);
    let body = &line[indent.len()..];
    if body.is_empty() {
        return vec![line.to_string()];
    }
    let options = Options::new(width)
        .initial_indent(indent)
        .subsequent_indent(continuation)
        .break_words(false)
        .word_separator(WordSeparator::AsciiSpace)
        .word_splitter(WordSplitter::NoHyphenation)
        .wrap_algorithm(WrapAlgorithm::FirstFit);
    textwrap::wrap(body, &options)
        .into_iter()
        .map(Cow::into_owned)
        .collect()
}
