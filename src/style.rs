//! ANSI terminal styling for the reformatter.
//!
//! [`TerminalFormatter`] is the stock [`Formatter`] used by the `clikit`
//! binary. Whether colours are used is decided once by the caller, usually
//! through [`ColorChoice::enabled`], and stored on the formatter.

use std::io::IsTerminal;

use clap::ValueEnum;
use owo_colors::OwoColorize;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    codefmt,
    mdfmt::{Formatter, Location, Reformatter, WrapMode},
};

/// Formatter emitting ANSI escape sequences and section indentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalFormatter {
    colors: bool,
    indent_width: usize,
}

impl Default for TerminalFormatter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TerminalFormatter {
    /// Create a formatter, emitting escape sequences only when `colors` is set.
    #[must_use]
    pub fn new(colors: bool) -> Self {
        Self {
            colors,
            indent_width: 2,
        }
    }

    /// Spaces added per header level; `0` disables indentation.
    #[must_use]
    pub fn indent_width(mut self, indent_width: usize) -> Self {
        self.indent_width = indent_width;
        self
    }

    /// Whether escape sequences are emitted.
    #[must_use]
    pub fn colors(&self) -> bool {
        self.colors
    }
}

impl Formatter for TerminalFormatter {
    fn header(&self, loc: &Location, text: &str) -> Option<String> {
        if !self.colors {
            return None;
        }
        let title = format!("{} {text}", "#".repeat(loc.level));
        Some(match loc.level {
            1 => title.bold().magenta().to_string(),
            2 => title.bold().blue().to_string(),
            _ => title.bold().to_string(),
        })
    }

    fn link(&self, text: &str, url: &str) -> Option<String> {
        self.colors
            .then(|| format!("{} ({})", text.underline(), url.dimmed()))
    }

    fn code(&self, code: &str) -> Option<String> {
        self.colors.then(|| code.cyan().to_string())
    }

    fn code_block(&self, loc: &Location, line: &str) -> Option<String> {
        self.colors
            .then(|| codefmt::highlight(&loc.code_block_lang, line))
    }

    fn bold(&self, text: &str) -> Option<String> {
        self.colors.then(|| text.bold().to_string())
    }

    fn italic(&self, text: &str) -> Option<String> {
        self.colors.then(|| text.italic().to_string())
    }

    fn indent(&self, loc: &Location) -> Option<String> {
        let depth = if loc.header {
            loc.level.saturating_sub(1)
        } else {
            loc.level
        };
        let width = depth * self.indent_width;
        (width > 0).then(|| " ".repeat(width))
    }
}

/// When to emit colour.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// Colour when writing to a terminal that allows it.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    #[must_use]
    pub fn enabled(self) -> bool {
        match self {
            Self::Auto => should_use_colors(),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

/// Determine whether colours should be used for standard output.
///
/// `NO_COLOR` wins over everything, then `CLICOLOR_FORCE` (any value but
/// `0`), then `CLICOLOR=0`, then TTY detection.
#[must_use]
pub fn should_use_colors() -> bool {
    colors_from(|name| std::env::var(name).ok(), std::io::stdout().is_terminal())
}

fn colors_from<L>(lookup: L, is_tty: bool) -> bool
where
    L: Fn(&str) -> Option<String>,
{
    if lookup("NO_COLOR").is_some() {
        return false;
    }
    if lookup("CLICOLOR_FORCE").is_some_and(|v| v != "0") {
        return true;
    }
    if lookup("CLICOLOR").is_some_and(|v| v == "0") {
        return false;
    }
    is_tty
}

/// Width of the attached terminal in columns, if there is one.
#[must_use]
pub fn terminal_columns() -> Option<usize> {
    terminal_size::terminal_size().map(|(terminal_size::Width(w), _)| usize::from(w))
}

/// Serialisable settings for building a terminal [`Reformatter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "kebab-case")]
pub struct FormatSettings {
    /// Column width; `0` uses the terminal width, or disables wrapping when
    /// no terminal is attached.
    pub width: usize,
    pub wrap_mode: WrapMode,
    pub color: ColorChoice,
    /// Spaces of indentation per header level.
    pub indent_width: usize,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            width: 0,
            wrap_mode: WrapMode::default(),
            color: ColorChoice::default(),
            indent_width: 2,
        }
    }
}

impl FormatSettings {
    /// Build a reformatter from these settings.
    #[must_use]
    pub fn reformatter(&self) -> Reformatter<TerminalFormatter> {
        let width = match self.width {
            0 => terminal_columns().unwrap_or(0),
            w => w,
        };
        let style = TerminalFormatter::new(self.color.enabled()).indent_width(self.indent_width);
        Reformatter::new(style)
            .width(width)
            .wrap_mode(self.wrap_mode)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;
    use textwrap::core::display_width;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[rstest]
    #[case(&[("NO_COLOR", "1")], true, false)]
    #[case(&[("NO_COLOR", "1"), ("CLICOLOR_FORCE", "1")], true, false)]
    #[case(&[("CLICOLOR_FORCE", "1")], false, true)]
    #[case(&[("CLICOLOR_FORCE", "0")], false, false)]
    #[case(&[("CLICOLOR", "0")], true, false)]
    #[case(&[], true, true)]
    #[case(&[], false, false)]
    fn colour_detection_priority(
        #[case] vars: &[(&str, &str)],
        #[case] tty: bool,
        #[case] expected: bool,
    ) {
        assert_eq!(colors_from(lookup(vars), tty), expected);
    }

    #[test]
    fn indentation_follows_header_level() {
        let style = TerminalFormatter::new(false);
        let header = Location {
            level: 2,
            header: true,
            ..Location::default()
        };
        let body = Location {
            level: 2,
            ..Location::default()
        };
        assert_eq!(style.indent(&header).as_deref(), Some("  "));
        assert_eq!(style.indent(&body).as_deref(), Some("    "));
        assert_eq!(style.indent(&Location::default()), None);
    }

    #[test]
    fn without_colours_only_indentation_is_applied() {
        let out = Reformatter::new(TerminalFormatter::new(false))
            .format_lines(&["# Title", "some **bold** text"]);
        assert_eq!(out, vec!["# Title", "  some **bold** text"]);
    }

    #[test]
    fn header_keeps_its_markers() {
        let out = Reformatter::new(TerminalFormatter::new(true)).format("## Setup");
        assert!(out.contains("## Setup"));
        assert_eq!(display_width(&out), "  ## Setup".len());
    }

    #[test]
    fn table_cells_keep_width_with_colours() {
        let row = "| **bold** | `code` |";
        let out = Reformatter::new(TerminalFormatter::new(true).indent_width(0)).format(row);
        assert_eq!(display_width(&out), display_width(row));
    }

    #[test]
    fn settings_default_serialises_kebab_case() {
        let json = serde_json::to_value(FormatSettings::default()).expect("serialise settings");
        assert_eq!(json["wrap-mode"], "current");
        let block: WrapMode = serde_json::from_str("\"block\"").expect("parse wrap mode");
        assert_eq!(block, WrapMode::BlockIndent);
        assert_eq!(json["color"], "auto");
        assert_eq!(json["indent-width"], 2);
    }
}
