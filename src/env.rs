//! Environment-variable overrides for command-line flags.
//!
//! [`bind_env`] annotates clap arguments with variable names built by
//! [`env_var_name`], so clap falls back to the environment for any flag not
//! given on the command line. [`provenance`] reports where a parsed value
//! came from. [`EnvReader`] covers values read outside of clap, collecting
//! parse failures instead of stopping at the first one.

use std::{fmt, str::FromStr};

use clap::{ArgMatches, Command, parser::ValueSource};
use thiserror::Error;

/// Build the variable name for `flag`: `PREFIX_FLAG`, upper-cased, with `-`
/// and `.` replaced by `_`. An empty prefix yields just the flag part.
///
/// # Panics
/// Panics if `flag` is empty.
///
/// # Examples
///
/// ```
/// use clikit::env::env_var_name;
///
/// assert_eq!(env_var_name("clikit", "wrap-mode"), "CLIKIT_WRAP_MODE");
/// ```
#[must_use]
pub fn env_var_name(prefix: &str, flag: &str) -> String {
    assert!(!flag.is_empty(), "flag name must not be empty");
    let name = if prefix.is_empty() {
        flag.to_string()
    } else {
        format!("{prefix}_{flag}")
    };
    name.replace(['-', '.'], "_").to_uppercase()
}

/// Bind every named flag of `cmd` and its subcommands to an environment
/// variable.
///
/// Positional arguments, arguments without a long name and arguments that
/// already declare a variable are left alone.
#[must_use]
pub fn bind_env(cmd: Command, prefix: &str) -> Command {
    let bindings: Vec<(String, String)> = cmd
        .get_arguments()
        .filter(|arg| !arg.is_positional() && arg.get_env().is_none())
        .filter_map(|arg| {
            let long = arg.get_long()?;
            Some((arg.get_id().to_string(), env_var_name(prefix, long)))
        })
        .collect();
    let subcommands: Vec<String> = cmd
        .get_subcommands()
        .map(|sub| sub.get_name().to_string())
        .collect();

    let cmd = bindings.into_iter().fold(cmd, |cmd, (id, name)| {
        cmd.mut_arg(id, |arg| arg.env(name))
    });
    subcommands.into_iter().fold(cmd, |cmd, name| {
        cmd.mut_subcommand(name, |sub| bind_env(sub, prefix))
    })
}

/// Where a flag's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    CommandLine,
    Environment,
    Default,
    Unset,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CommandLine => "command line",
            Self::Environment => "environment",
            Self::Default => "default",
            Self::Unset => "unset",
        })
    }
}

/// Report the source of argument `id` in `matches`.
#[must_use]
pub fn provenance(matches: &ArgMatches, id: &str) -> Provenance {
    match matches.value_source(id) {
        Some(ValueSource::CommandLine) => Provenance::CommandLine,
        Some(ValueSource::EnvVariable) => Provenance::Environment,
        Some(ValueSource::DefaultValue) => Provenance::Default,
        Some(_) | None => Provenance::Unset,
    }
}

/// Whether argument `id` was set explicitly, on the command line or through
/// the environment.
#[must_use]
pub fn changed(matches: &ArgMatches, id: &str) -> bool {
    matches!(
        provenance(matches, id),
        Provenance::CommandLine | Provenance::Environment
    )
}

/// A variable whose value failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value {value:?} for {name}: {message}")]
pub struct EnvError {
    pub name: String,
    pub value: String,
    pub message: String,
}

/// Every parse failure seen by an [`EnvReader`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join(.0))]
pub struct EnvErrors(pub Vec<EnvError>);

fn join(errors: &[EnvError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse a boolean the way flags accept them.
///
/// # Errors
/// Returns a message when `value` is not a recognised boolean word.
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" | "" => Ok(false),
        other => Err(format!("expected a boolean, got {other:?}")),
    }
}

/// Reads typed values from the environment through an injectable lookup.
///
/// Missing variables yield `None`. Values that fail to parse also yield
/// `None` and are remembered until [`EnvReader::finish`].
pub struct EnvReader<L> {
    lookup: L,
    errors: Vec<EnvError>,
}

impl EnvReader<fn(&str) -> Option<String>> {
    /// A reader over the process environment.
    #[must_use]
    pub fn from_process() -> Self {
        Self::new(|name| std::env::var(name).ok())
    }
}

impl<L> EnvReader<L>
where
    L: Fn(&str) -> Option<String>,
{
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            errors: Vec::new(),
        }
    }

    /// The raw value of `name`.
    pub fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
    }

    /// Parse `name` with [`FromStr`].
    pub fn parse<T>(&mut self, name: &str) -> Option<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.parse_with(name, |v| v.trim().parse::<T>().map_err(|e| e.to_string()))
    }

    /// Parse `name` with [`parse_bool`].
    pub fn bool(&mut self, name: &str) -> Option<bool> {
        self.parse_with(name, parse_bool)
    }

    fn parse_with<T, P>(&mut self, name: &str, parse: P) -> Option<T>
    where
        P: FnOnce(&str) -> Result<T, String>,
    {
        let value = self.string(name)?;
        match parse(&value) {
            Ok(parsed) => Some(parsed),
            Err(message) => {
                self.errors.push(EnvError {
                    name: name.to_string(),
                    value,
                    message,
                });
                None
            }
        }
    }

    /// Return the collected parse failures, if any.
    ///
    /// # Errors
    /// Returns [`EnvErrors`] when at least one value failed to parse.
    pub fn finish(self) -> Result<(), EnvErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(EnvErrors(self.errors))
        }
    }
}
