//! Helpers for building command-line tools.
//!
//! The centrepiece is [`mdfmt`], a line-oriented Markdown reformatter that
//! restyles documents for the terminal through a [`mdfmt::Formatter`].
//! [`style`] provides the ANSI formatter used by the `clikit` binary. The
//! remaining modules wrap `clap`, `schemars` and `tracing-subscriber`:
//!
//! - [`flags`] prints grouped flag usage and reference pages;
//! - [`env`] binds flags to environment variables and reports provenance;
//! - [`schema`] writes JSON Schema files;
//! - [`secret`] resolves `env:`, `file:` and `cmd:` secret sources;
//! - [`telemetry`] installs a tracing subscriber from the environment.

pub mod codefmt;
pub mod env;
pub mod flags;
pub mod io;
pub mod mdfmt;
pub mod schema;
pub mod secret;
pub mod style;
pub mod telemetry;

pub use crate::{
    mdfmt::{Formatter, Location, Plain, Reformatter, WrapMode},
    style::{ColorChoice, FormatSettings, TerminalFormatter},
};
