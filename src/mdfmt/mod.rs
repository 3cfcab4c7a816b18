//! Markdown-to-terminal reformatting.
//!
//! [`Reformatter`] walks a document one line at a time, tracking fenced code
//! blocks, HTML comments and table rows in a [`Location`]. Inline constructs
//! are handed to a [`Formatter`], whose methods return `None` when the
//! formatter does not style that construct. The pass never fails: an
//! unterminated fence or comment keeps the rest of the document inside it.
//!
//! ```
//! use clikit::mdfmt::{Formatter, Reformatter};
//!
//! struct Shout;
//!
//! impl Formatter for Shout {
//!     fn bold(&self, text: &str) -> Option<String> {
//!         Some(text.to_uppercase())
//!     }
//! }
//!
//! let out = Reformatter::new(Shout).format("a **loud** word");
//! assert_eq!(out, "a LOUD word");
//! ```

mod comment;
mod inline;
mod location;
mod table;
mod wrap;

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use self::comment::Comment;
pub use self::location::Location;

/// Styling capabilities for each markdown construct.
///
/// Every method defaults to `None`, meaning the construct is left as written.
pub trait Formatter {
    /// Style a header. `text` has its `#` markers and surrounding whitespace
    /// removed; `loc.level` holds the header level.
    fn header(&self, loc: &Location, text: &str) -> Option<String> {
        let _ = (loc, text);
        None
    }

    /// Style a `[text](url)` link.
    fn link(&self, text: &str, url: &str) -> Option<String> {
        let _ = (text, url);
        None
    }

    /// Style the contents of an inline code span.
    fn code(&self, code: &str) -> Option<String> {
        let _ = code;
        None
    }

    /// Style one raw line inside a fenced code block.
    fn code_block(&self, loc: &Location, line: &str) -> Option<String> {
        let _ = (loc, line);
        None
    }

    /// Style the contents of a `**bold**` or `__bold__` span.
    fn bold(&self, text: &str) -> Option<String> {
        let _ = text;
        None
    }

    /// Style the contents of a `*italic*` or `_italic_` span.
    fn italic(&self, text: &str) -> Option<String> {
        let _ = text;
        None
    }

    /// Prefix prepended to every emitted line.
    fn indent(&self, loc: &Location) -> Option<String> {
        let _ = loc;
        None
    }
}

impl<F: Formatter + ?Sized> Formatter for &F {
    fn header(&self, loc: &Location, text: &str) -> Option<String> {
        (**self).header(loc, text)
    }

    fn link(&self, text: &str, url: &str) -> Option<String> {
        (**self).link(text, url)
    }

    fn code(&self, code: &str) -> Option<String> {
        (**self).code(code)
    }

    fn code_block(&self, loc: &Location, line: &str) -> Option<String> {
        (**self).code_block(loc, line)
    }

    fn bold(&self, text: &str) -> Option<String> {
        (**self).bold(text)
    }

    fn italic(&self, text: &str) -> Option<String> {
        (**self).italic(text)
    }

    fn indent(&self, loc: &Location) -> Option<String> {
        (**self).indent(loc)
    }
}

/// A formatter with no capabilities; text passes through unstyled.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl Formatter for Plain {}

/// Indentation used for continuation lines when wrapping.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, ValueEnum,
)]
pub enum WrapMode {
    /// Reuse the leading whitespace of the line being wrapped.
    #[default]
    #[serde(rename = "current")]
    #[value(name = "current")]
    CurrentIndent,
    /// Inside code blocks, reuse the indentation of the opening fence.
    #[serde(rename = "block")]
    #[value(name = "block")]
    BlockIndent,
}

/// Line-oriented markdown reformatter.
#[derive(Debug, Clone)]
pub struct Reformatter<F> {
    style: F,
    width: usize,
    wrap_mode: WrapMode,
}

impl<F: Formatter> Reformatter<F> {
    /// Create a reformatter with wrapping disabled.
    #[must_use]
    pub fn new(style: F) -> Self {
        Self {
            style,
            width: 0,
            wrap_mode: WrapMode::default(),
        }
    }

    /// Wrap output lines to `width` columns; `0` disables wrapping.
    #[must_use]
    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Choose how continuation lines are indented.
    #[must_use]
    pub fn wrap_mode(mut self, wrap_mode: WrapMode) -> Self {
        self.wrap_mode = wrap_mode;
        self
    }

    /// The formatter styling each construct.
    #[must_use]
    pub fn style(&self) -> &F {
        &self.style
    }

    /// Reformat a whole document, keeping a trailing newline if present.
    #[must_use]
    pub fn format(&self, markdown: &str) -> String {
        let lines: Vec<&str> = markdown.lines().collect();
        let mut out = self.format_lines(&lines).join("\n");
        if markdown.ends_with('\n') {
            out.push('\n');
        }
        out
    }

    /// Reformat a sequence of lines.
    #[must_use]
    pub fn format_lines<S: AsRef<str>>(&self, lines: &[S]) -> Vec<String> {
        let mut loc = Location::default();
        let mut out = Vec::with_capacity(lines.len());
        for line in lines {
            loc.next_line();
            let Some(styled) = self.classify(&mut loc, line.as_ref()) else {
                continue;
            };
            let prefix = self.style.indent(&loc).unwrap_or_default();
            let line = if styled.is_empty() {
                styled
            } else {
                format!("{prefix}{styled}")
            };
            if loc.table || self.width == 0 {
                out.push(line);
                continue;
            }
            // Block continuations line up with the fence as emitted, prefix included.
            let continuation = if loc.code_block && self.wrap_mode == WrapMode::BlockIndent {
                format!("{prefix}{}", loc.block_indent)
            } else {
                location::leading_whitespace(&line).to_string()
            };
            out.extend(wrap::wrap_line(&line, self.width, &continuation));
        }
        if loc.code_block || loc.comment {
            tracing::debug!(
                code_block = loc.code_block,
                comment = loc.comment,
                "document ended inside an open block"
            );
        }
        out
    }

    /// Classify `line`, update `loc` and return the styled text.
    ///
    /// `None` means the line is suppressed.
    fn classify(&self, loc: &mut Location, line: &str) -> Option<String> {
        if loc.comment {
            let rest = comment::close(line)?;
            loc.comment = false;
            if rest.trim().is_empty() {
                return None;
            }
            return Some(self.regular(loc, rest));
        }

        if loc.code_block {
            if loc.closes_block(line) {
                loc.close_block();
                return Some(line.to_string());
            }
            return Some(
                self.style
                    .code_block(loc, line)
                    .unwrap_or_else(|| line.to_string()),
            );
        }

        if let Some((fence_len, lang)) = location::fence_start(line) {
            tracing::trace!(fence_len, lang, "code block opened");
            loc.open_block(line, fence_len, lang);
            return Some(line.to_string());
        }

        if line.trim_start().starts_with('|') {
            loc.table = true;
            return Some(table::format_row(line, |cell| {
                inline::format_inline(cell, &self.style)
            }));
        }

        if line.contains(comment::OPEN) {
            match comment::strip(line) {
                Comment::Opened => {
                    loc.comment = true;
                    return None;
                }
                Comment::Stripped(rest) => {
                    if rest.trim().is_empty() {
                        return None;
                    }
                    return Some(self.regular(loc, &rest));
                }
            }
        }

        Some(self.regular(loc, line))
    }

    fn regular(&self, loc: &mut Location, line: &str) -> String {
        let level = location::header_level(line);
        if level > 0 {
            loc.level = level;
            loc.header = true;
        }
        let segments = inline::links(line, &self.style);
        if loc.header {
            let text = inline::concat(&segments);
            let title = text.trim_start().trim_start_matches('#').trim();
            return self.style.header(loc, title).unwrap_or(text);
        }
        inline::finish(segments, &self.style)
    }
}
