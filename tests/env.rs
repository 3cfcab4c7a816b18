//! Environment overrides applied through clap.
//!
//! These tests change the process environment, so they run serially.

use clap::{Arg, ArgAction, Command};
use clikit::env::{Provenance, bind_env, changed, provenance};
use serial_test::serial;

#[macro_use]
mod prelude;
use prelude::*;

const WIDTH_VAR: &str = "ENVTEST_WIDTH";

fn app() -> Command {
    let render = Command::new("render")
        .arg(Arg::new("width").long("width").value_parser(clap::value_parser!(usize)))
        .arg(Arg::new("verbose").long("verbose").action(ArgAction::SetTrue));
    bind_env(Command::new("envtest").subcommand(render), "envtest")
}

/// Sets a variable for the duration of a test.
struct EnvGuard(&'static str);

impl EnvGuard {
    fn set(name: &'static str, value: &str) -> Self {
        // SAFETY: tests touching the environment are marked `#[serial]`.
        unsafe { std::env::set_var(name, value) };
        Self(name)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // SAFETY: tests touching the environment are marked `#[serial]`.
        unsafe { std::env::remove_var(self.0) };
    }
}

fn render_matches(args: &[&str]) -> clap::ArgMatches {
    let matches = app()
        .try_get_matches_from(args)
        .expect("arguments should parse");
    matches
        .subcommand_matches("render")
        .expect("render subcommand")
        .clone()
}

#[test]
#[serial]
fn environment_supplies_missing_flag() {
    let _guard = EnvGuard::set(WIDTH_VAR, "72");
    let matches = render_matches(&["envtest", "render"]);
    assert_eq!(matches.get_one::<usize>("width"), Some(&72));
    assert_eq!(provenance(&matches, "width"), Provenance::Environment);
    assert!(changed(&matches, "width"));
}

#[test]
#[serial]
fn command_line_ignores_environment() {
    let _guard = EnvGuard::set(WIDTH_VAR, "72");
    let matches = render_matches(&["envtest", "render", "--width", "40"]);
    assert_eq!(matches.get_one::<usize>("width"), Some(&40));
    assert_eq!(provenance(&matches, "width"), Provenance::CommandLine);
}

#[test]
#[serial]
fn unset_variable_leaves_flag_unchanged() {
    // SAFETY: tests touching the environment are marked `#[serial]`.
    unsafe { std::env::remove_var(WIDTH_VAR) };
    let matches = render_matches(&["envtest", "render"]);
    assert_eq!(matches.get_one::<usize>("width"), None);
    assert!(!changed(&matches, "width"));
}

#[test]
#[serial]
fn unparsable_value_is_an_error() {
    let _guard = EnvGuard::set(WIDTH_VAR, "wide");
    assert!(app().try_get_matches_from(["envtest", "render"]).is_err());
}

#[rstest]
#[case("true", true)]
#[case("false", false)]
#[serial]
fn boolean_flags_read_the_environment(#[case] value: &str, #[case] expected: bool) {
    let _guard = EnvGuard::set("ENVTEST_VERBOSE", value);
    let matches = render_matches(&["envtest", "render"]);
    assert_eq!(matches.get_flag("verbose"), expected);
}
