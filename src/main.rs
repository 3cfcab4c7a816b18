use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use clikit::{
    ColorChoice, FormatSettings, WrapMode,
    env::{bind_env, provenance},
    flags::{FlagUsages, group},
    io::{render_files, render_stdin, write_pages},
    schema::{SchemaEntry, write_schemas},
    telemetry::{self, TelemetryConfig},
};

const ENV_PREFIX: &str = "CLIKIT";
const DOCS_COLUMNS: usize = 100;
const QUICKSTART: &str = include_str!("quickstart.md");

#[derive(Parser)]
#[command(name = "clikit", version, about = "Render Markdown for the terminal")]
struct Cli {
    /// Log filter directives, e.g. `info` or `clikit=debug`
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the version
    Version,
    /// Show the quick-start guide
    Quickstart(DisplayOpts),
    /// Render Markdown files, or standard input when none are given
    Render {
        #[command(flatten)]
        display: DisplayOpts,
        /// Markdown files to render
        files: Vec<PathBuf>,
    },
    /// Write a Markdown reference page for every command
    Docs(OutDir),
    /// Write JSON schemas for the settings types
    Schema(OutDir),
}

#[derive(clap::Args, Clone, Copy)]
struct DisplayOpts {
    /// Column width; 0 uses the terminal width
    #[arg(long, default_value_t = 0)]
    width: usize,
    /// Indentation for wrapped code-block lines
    #[arg(long, value_enum, default_value_t = WrapMode::default())]
    wrap_mode: WrapMode,
    /// When to use colour
    #[arg(long, value_enum, default_value_t = ColorChoice::default())]
    color: ColorChoice,
}

impl DisplayOpts {
    fn settings(self) -> FormatSettings {
        FormatSettings {
            width: self.width,
            wrap_mode: self.wrap_mode,
            color: self.color,
            ..FormatSettings::default()
        }
    }
}

#[derive(clap::Args)]
struct OutDir {
    /// Directory to write into; created if missing
    #[arg(long)]
    out: PathBuf,
}

const DISPLAY_FLAGS: [&str; 3] = ["width", "wrap_mode", "color"];

/// The full command tree with flag groups and environment bindings applied.
fn command() -> clap::Command {
    let cmd = Cli::command()
        .mut_subcommand("render", |sub| group(sub, "Output", &DISPLAY_FLAGS))
        .mut_subcommand("quickstart", |sub| group(sub, "Output", &DISPLAY_FLAGS));
    bind_env(cmd, ENV_PREFIX)
}

fn init_telemetry(cli: &Cli) -> Result<()> {
    let mut config = TelemetryConfig::from_env(ENV_PREFIX, env!("CARGO_PKG_NAME"))
        .context("invalid telemetry environment")?;
    if let Some(filter) = &cli.log_level {
        config = config.with_filter(filter.clone());
    }
    telemetry::init(&config).context("failed to set up logging")
}

fn log_provenance(matches: &ArgMatches) {
    if let Some((name, sub)) = matches.subcommand()
        && matches!(name, "render" | "quickstart")
    {
        for id in DISPLAY_FLAGS {
            tracing::debug!(flag = id, source = %provenance(sub, id), "display setting");
        }
    }
}

fn render(display: DisplayOpts, files: &[PathBuf]) -> Result<()> {
    let _span = tracing::info_span!("render", files = files.len()).entered();
    let reformatter = display.settings().reformatter();
    if files.is_empty() {
        print!("{}", render_stdin(&reformatter).context("failed to read stdin")?);
        return Ok(());
    }
    for (path, result) in render_files(files, &reformatter) {
        let text = result.with_context(|| format!("failed to read {}", path.display()))?;
        print!("{text}");
    }
    Ok(())
}

fn docs(out: &OutDir) -> Result<()> {
    let pages = FlagUsages::new().columns(DOCS_COLUMNS).pages(&command());
    let written = write_pages(&out.out, &pages)
        .with_context(|| format!("failed to write docs to {}", out.out.display()))?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn schema(out: &OutDir) -> Result<()> {
    let entries = [
        SchemaEntry::of::<FormatSettings>(),
        SchemaEntry::of::<TelemetryConfig>(),
    ];
    for path in write_schemas(&out.out, &entries)? {
        println!("{}", path.display());
    }
    Ok(())
}

/// Entry point for the `clikit` sample tool.
///
/// ```sh
/// # Render a file for the terminal
/// clikit render README.md
///
/// # Wrap at 72 columns, configured through the environment
/// CLIKIT_WIDTH=72 clikit render README.md
///
/// # Generate reference pages and schemas
/// clikit docs --out target/docs
/// clikit schema --out target/schemas
/// ```
fn main() -> Result<()> {
    let matches = command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    init_telemetry(&cli)?;
    log_provenance(&matches);

    match &cli.command {
        Commands::Version => println!("clikit {}", env!("CARGO_PKG_VERSION")),
        Commands::Quickstart(display) => {
            print!("{}", display.settings().reformatter().format(QUICKSTART));
        }
        Commands::Render { display, files } => render(*display, files)?,
        Commands::Docs(out) => docs(out)?,
        Commands::Schema(out) => schema(out)?,
    }
    Ok(())
}
