//! Per-line cursor state for the reformatter.
//!
//! [`Location`] replaces the fence bookkeeping a plain line scanner would
//! otherwise keep in loose booleans. Fence matching follows the usual
//! backtick rules: a block opened with N backticks closes on a line whose
//! trimmed form starts with at least N backticks.

/// Parsing context handed to [`Formatter`](super::Formatter) callbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// Level of the most recent header, `0` before the first one.
    pub level: usize,
    /// The current line is a header.
    pub header: bool,
    /// The current line is inside a fenced code block.
    pub code_block: bool,
    /// Info string of the open code block.
    pub code_block_lang: String,
    /// Number of backticks in the opening fence.
    pub fence_len: usize,
    /// Leading whitespace of the line that opened the code block.
    pub block_indent: String,
    /// Inside a multi-line HTML comment.
    pub comment: bool,
    /// The current line is a table row.
    pub table: bool,
}

impl Location {
    /// Clear the per-line flags before classifying the next line.
    pub(crate) fn next_line(&mut self) {
        self.header = false;
        self.table = false;
    }

    pub(crate) fn open_block(&mut self, line: &str, fence_len: usize, lang: &str) {
        self.code_block = true;
        self.fence_len = fence_len;
        self.code_block_lang = lang.to_string();
        self.block_indent = leading_whitespace(line).to_string();
    }

    pub(crate) fn closes_block(&self, line: &str) -> bool {
        self.code_block && backtick_run(line.trim()) >= self.fence_len
    }

    pub(crate) fn close_block(&mut self) {
        self.code_block = false;
        self.fence_len = 0;
        self.code_block_lang.clear();
    }
}

/// Count the backticks at the start of `text`.
pub(crate) fn backtick_run(text: &str) -> usize {
    text.bytes().take_while(|b| *b == b'`').count()
}

/// Return the fence length and info string if `line` opens a code block.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(fence_start("  ```rust"), Some((3, "rust")));
/// assert_eq!(fence_start("``inline``"), None);
/// ```
pub(crate) fn fence_start(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim();
    let len = backtick_run(trimmed);
    (len >= 3).then(|| (len, trimmed[len..].trim()))
}

/// Count leading `#` markers; `0` means the line is not a header.
pub(crate) fn header_level(line: &str) -> usize {
    line.trim_start().bytes().take_while(|b| *b == b'#').count()
}

pub(crate) fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_start();
    &line[..line.len() - trimmed.len()]
}
