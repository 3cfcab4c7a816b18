//! Grouped flag usage output.
//!
//! Groups are stored as clap help headings, so `--help` and the renderer here
//! agree on them. [`FlagUsages`] prints each group under its own heading with
//! the usage column aligned across groups and wrapped to a column width. The
//! strings for each flag come from a [`UsageFormatter`].

use clap::{Arg, Command};
use textwrap::{Options, WordSeparator, WordSplitter, WrapAlgorithm};
use unicode_width::UnicodeWidthStr;

const GAP: usize = 3;
const MIN_USAGE_WIDTH: usize = 20;

/// Attach the group `name` to each arg in `ids`.
///
/// # Panics
/// Panics if an id does not name an argument of `cmd`.
#[must_use]
pub fn group(cmd: Command, name: &str, ids: &[&str]) -> Command {
    ids.iter().fold(cmd, |cmd, id| {
        cmd.mut_arg(*id, |arg| arg.help_heading(name.to_string()))
    })
}

/// The parts of a clap [`Arg`] needed to describe it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagInfo {
    pub id: String,
    pub short: Option<char>,
    pub long: Option<String>,
    pub takes_value: bool,
    pub value_names: Vec<String>,
    pub help: String,
    pub defaults: Vec<String>,
    pub env: Option<String>,
    pub group: Option<String>,
}

impl FlagInfo {
    #[must_use]
    pub fn from_arg(arg: &Arg) -> Self {
        let id = arg.get_id().to_string();
        let takes_value = arg.get_action().takes_values();
        let value_names = match arg.get_value_names() {
            Some(names) => names.iter().map(ToString::to_string).collect(),
            None if takes_value => vec![id.to_uppercase()],
            None => Vec::new(),
        };
        Self {
            short: arg.get_short(),
            long: arg.get_long().map(str::to_string),
            takes_value,
            value_names,
            help: arg.get_help().map(ToString::to_string).unwrap_or_default(),
            defaults: arg
                .get_default_values()
                .iter()
                .map(|v| v.to_string_lossy().into_owned())
                .collect(),
            env: arg.get_env().map(|v| v.to_string_lossy().into_owned()),
            group: arg.get_help_heading().map(str::to_string),
            id,
        }
    }
}

/// Flags sharing a group; `name` is `None` for ungrouped flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagGroup {
    pub name: Option<String>,
    pub flags: Vec<FlagInfo>,
}

/// Collect the visible flags of `cmd` by group.
///
/// Ungrouped flags come first, then groups in order of first appearance.
/// Positional and hidden arguments are skipped.
#[must_use]
pub fn flag_groups(cmd: &Command) -> Vec<FlagGroup> {
    let mut cmd = cmd.clone();
    cmd.build();
    let mut groups = vec![FlagGroup {
        name: None,
        flags: Vec::new(),
    }];
    for arg in cmd.get_arguments() {
        if arg.is_positional() || arg.is_hide_set() {
            continue;
        }
        let info = FlagInfo::from_arg(arg);
        match groups.iter_mut().find(|g| g.name == info.group) {
            Some(group) => group.flags.push(info),
            None => groups.push(FlagGroup {
                name: info.group.clone(),
                flags: vec![info],
            }),
        }
    }
    groups.retain(|g| !g.flags.is_empty());
    groups
}

fn visible_subcommands(cmd: &Command) -> impl Iterator<Item = &Command> {
    cmd.get_subcommands()
        .filter(|sub| !sub.is_hide_set() && sub.get_name() != "help")
}

/// Strings printed for each flag.
pub trait UsageFormatter {
    /// Flag names, e.g. `-w, --width`.
    fn name(&self, flag: &FlagInfo) -> String {
        match (flag.short, flag.long.as_deref()) {
            (Some(s), Some(l)) => format!("-{s}, --{l}"),
            (Some(s), None) => format!("-{s}"),
            (None, Some(l)) => format!("    --{l}"),
            (None, None) => flag.id.clone(),
        }
    }

    /// Value placeholder, empty for boolean flags.
    fn value_type(&self, flag: &FlagInfo) -> String {
        flag.value_names
            .iter()
            .map(|n| format!("<{n}>"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Help text with default value and environment variable.
    fn usage(&self, flag: &FlagInfo) -> String {
        let mut usage = flag.help.clone();
        if flag.takes_value && !flag.defaults.is_empty() {
            if !usage.is_empty() {
                usage.push(' ');
            }
            usage.push_str(&format!("(default: {})", flag.defaults.join(", ")));
        }
        if let Some(env) = &flag.env {
            if !usage.is_empty() {
                usage.push(' ');
            }
            usage.push_str(&format!("[env: {env}]"));
        }
        usage
    }
}

/// The stock [`UsageFormatter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultUsage;

impl UsageFormatter for DefaultUsage {}

/// Renders grouped flag usage text.
#[derive(Debug, Clone)]
pub struct FlagUsages<U = DefaultUsage> {
    columns: usize,
    formatter: U,
}

impl Default for FlagUsages<DefaultUsage> {
    fn default() -> Self {
        Self::new()
    }
}

impl FlagUsages<DefaultUsage> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_formatter(DefaultUsage)
    }
}

impl<U: UsageFormatter> FlagUsages<U> {
    #[must_use]
    pub fn with_formatter(formatter: U) -> Self {
        Self {
            columns: 0,
            formatter,
        }
    }

    /// Wrap usage text to `columns`; `0` disables wrapping.
    #[must_use]
    pub fn columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    /// Render the flags of `cmd`.
    #[must_use]
    pub fn render(&self, cmd: &Command) -> String {
        self.render_groups(&flag_groups(cmd))
    }

    /// Render pre-collected groups.
    #[must_use]
    pub fn render_groups(&self, groups: &[FlagGroup]) -> String {
        let rows: Vec<Vec<(String, String)>> = groups
            .iter()
            .map(|g| g.flags.iter().map(|f| self.row(f)).collect())
            .collect();
        let left_width = rows
            .iter()
            .flatten()
            .map(|(left, _)| UnicodeWidthStr::width(left.as_str()))
            .max()
            .unwrap_or(0);
        let usage_col = left_width + GAP;

        let mut out = Vec::new();
        for (group, rows) in groups.iter().zip(&rows) {
            if !out.is_empty() {
                out.push(String::new());
            }
            out.push(format!("{}:", group.name.as_deref().unwrap_or("Flags")));
            for (left, usage) in rows {
                self.push_row(&mut out, left, usage, usage_col);
            }
        }
        let mut text = out.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }

    /// Markdown reference page for `cmd`, titled with `path`.
    #[must_use]
    pub fn markdown(&self, path: &str, cmd: &Command) -> String {
        let mut page = format!("# {path}\n\n");
        if let Some(about) = cmd.get_long_about().or_else(|| cmd.get_about()) {
            page.push_str(&format!("{about}\n\n"));
        }
        let usage = cmd.clone().bin_name(path).render_usage().to_string();
        page.push_str(&format!("```text\n{}\n```\n", usage.trim_end()));
        let flags = self.render(cmd);
        if !flags.is_empty() {
            page.push_str(&format!("\n## Flags\n\n```text\n{flags}```\n"));
        }
        let subcommands: Vec<_> = visible_subcommands(cmd).collect();
        if !subcommands.is_empty() {
            page.push_str("\n## Commands\n\n");
            for sub in subcommands {
                let about = sub.get_about().map(ToString::to_string).unwrap_or_default();
                page.push_str(&format!("- `{}`: {about}\n", sub.get_name()));
            }
        }
        page
    }

    /// One `(file name, page)` pair for `cmd` and each visible subcommand,
    /// depth first. File names join the command path with `-`.
    #[must_use]
    pub fn pages(&self, cmd: &Command) -> Vec<(String, String)> {
        let mut pages = Vec::new();
        self.collect_pages(cmd.get_name(), cmd, &mut pages);
        pages
    }

    fn collect_pages(&self, path: &str, cmd: &Command, pages: &mut Vec<(String, String)>) {
        let file = format!("{}.md", path.replace(' ', "-"));
        pages.push((file, self.markdown(path, cmd)));
        for sub in visible_subcommands(cmd) {
            self.collect_pages(&format!("{path} {}", sub.get_name()), sub, pages);
        }
    }

    fn row(&self, flag: &FlagInfo) -> (String, String) {
        let name = self.formatter.name(flag);
        let value = self.formatter.value_type(flag);
        let left = if value.is_empty() {
            format!("  {name}")
        } else {
            format!("  {name} {value}")
        };
        (left, self.formatter.usage(flag))
    }

    fn push_row(&self, out: &mut Vec<String>, left: &str, usage: &str, usage_col: usize) {
        if usage.is_empty() {
            out.push(left.to_string());
            return;
        }
        let pad = " ".repeat(usage_col - UnicodeWidthStr::width(left));
        let available = self.columns.saturating_sub(usage_col);
        if self.columns == 0 || available < MIN_USAGE_WIDTH {
            out.push(format!("{left}{pad}{usage}"));
            return;
        }
        let options = Options::new(available)
            .break_words(false)
            .word_separator(WordSeparator::AsciiSpace)
            .word_splitter(WordSplitter::NoHyphenation)
            .wrap_algorithm(WrapAlgorithm::FirstFit);
        let indent = " ".repeat(usage_col);
        for (i, line) in textwrap::wrap(usage, &options).iter().enumerate() {
            if i == 0 {
                out.push(format!("{left}{pad}{line}"));
            } else {
                out.push(format!("{indent}{line}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{Arg, ArgAction};

    use super::*;

    fn demo() -> Command {
        Command::new("demo")
            .disable_help_flag(true)
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .action(ArgAction::SetTrue)
                    .help("Print more"),
            )
            .arg(
                Arg::new("width")
                    .long("width")
                    .default_value("80")
                    .help("Column width"),
            )
            .arg(Arg::new("secret").long("secret").hide(true))
            .arg(Arg::new("file"))
    }

    #[test]
    fn groups_keep_first_appearance_order() {
        let cmd = group(demo(), "Output", &["width"]);
        let groups = flag_groups(&cmd);
        let names: Vec<_> = groups.iter().map(|g| g.name.clone()).collect();
        assert_eq!(names, vec![None, Some("Output".to_string())]);
        assert_eq!(groups[0].flags[0].id, "verbose");
        assert_eq!(groups[1].flags[0].id, "width");
    }

    #[test]
    fn hidden_and_positional_args_are_skipped() {
        let ids: Vec<_> = flag_groups(&demo())
            .into_iter()
            .flat_map(|g| g.flags)
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec!["verbose", "width"]);
    }

    #[test]
    fn flag_info_describes_values() {
        let groups = flag_groups(&demo());
        let width = &groups[0].flags[1];
        assert!(width.takes_value);
        assert_eq!(width.value_names, vec!["WIDTH"]);
        assert_eq!(width.defaults, vec!["80"]);
        let verbose = &groups[0].flags[0];
        assert!(!verbose.takes_value);
        assert!(verbose.value_names.is_empty());
    }

    #[test]
    fn renders_aligned_groups() {
        let cmd = group(demo(), "Output", &["width"]);
        let out = FlagUsages::new().render(&cmd);
        let verbose = format!("  -v, --verbose{}Print more", " ".repeat(9));
        let width = format!("      --width <WIDTH>{}Column width (default: 80)", " ".repeat(3));
        let expected = format!("Flags:\n{verbose}\n\nOutput:\n{width}\n");
        assert_eq!(out, expected);
    }

    #[test]
    fn wraps_usage_under_its_column() {
        let cmd = Command::new("demo").disable_help_flag(true).arg(
            Arg::new("mode")
                .long("mode")
                .help("one two three four five six seven eight nine ten"),
        );
        let out = FlagUsages::new().columns(46).render(&cmd);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[1], "      --mode <MODE>   one two three four five");
        assert_eq!(lines[2], format!("{}six seven eight nine ten", " ".repeat(22)));
    }

    #[test]
    fn pages_cover_every_visible_command() {
        let cmd = Command::new("tool")
            .about("A tool.")
            .subcommand(Command::new("run").about("Run it."))
            .subcommand(Command::new("secret").hide(true));
        let pages = FlagUsages::new().pages(&cmd);
        let names: Vec<_> = pages.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["tool.md", "tool-run.md"]);
        assert!(pages[0].1.starts_with("# tool\n\nA tool.\n"));
        assert!(pages[0].1.contains("- `run`: Run it."));
        assert!(pages[1].1.contains("Usage: tool run"));
    }

    #[test]
    fn custom_formatter_changes_names() {
        struct Upper;
        impl UsageFormatter for Upper {
            fn usage(&self, flag: &FlagInfo) -> String {
                flag.help.to_uppercase()
            }
        }
        let out = FlagUsages::with_formatter(Upper).render(&demo());
        assert!(out.contains("PRINT MORE"));
    }
}
