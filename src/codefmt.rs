//! Styling for lines inside fenced code blocks.
//!
//! Only comments and shell prompts are picked out; everything else is left
//! as written so copied snippets still run.

use owo_colors::OwoColorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Shell,
    Hash,
    Slash,
}

fn family(lang: &str) -> Option<Family> {
    let name = lang.split_whitespace().next()?.to_ascii_lowercase();
    match name.as_str() {
        "sh" | "bash" | "zsh" | "shell" | "console" => Some(Family::Shell),
        "toml" | "yaml" | "yml" | "python" | "py" => Some(Family::Hash),
        "rust" | "rs" | "go" | "c" | "cpp" | "java" | "js" | "javascript" | "ts"
        | "typescript" => Some(Family::Slash),
        _ => None,
    }
}

/// Style one code-block line according to the block language.
///
/// # Examples
///
/// ```
/// use clikit::codefmt::highlight;
///
/// assert_eq!(highlight("text", "plain"), "plain");
/// assert_ne!(highlight("sh", "# comment"), "# comment");
/// ```
#[must_use]
pub fn highlight(lang: &str, line: &str) -> String {
    let Some(family) = family(lang) else {
        return line.to_string();
    };
    let body = line.trim_start();
    let indent = &line[..line.len() - body.len()];
    let comment = match family {
        Family::Shell | Family::Hash => body.starts_with('#'),
        Family::Slash => body.starts_with("//"),
    };
    if comment {
        return format!("{indent}{}", body.dimmed());
    }
    if family == Family::Shell
        && let Some(command) = body.strip_prefix("$ ")
    {
        return format!("{indent}{} {command}", "$".dimmed());
    }
    line.to_string()
}
