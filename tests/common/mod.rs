//! Utility helpers shared across integration tests.
#![allow(dead_code, unused_macros, reason = "not every test binary uses every helper")]

use std::{
    fs,
    path::{Path, PathBuf},
};

/// Build a `Vec<String>` from a list of string slices.
macro_rules! lines_vec {
    ($($line:expr),* $(,)?) => {
        vec![$($line.to_string()),*]
    };
}

/// Variables that change `clikit` output when inherited from the caller.
const AMBIENT_VARS: &[&str] = &[
    "NO_COLOR",
    "CLICOLOR",
    "CLICOLOR_FORCE",
    "OTEL_SERVICE_NAME",
    "OTEL_EXPORTER_OTLP_ENDPOINT",
    "CLIKIT_WIDTH",
    "CLIKIT_WRAP_MODE",
    "CLIKIT_COLOR",
    "CLIKIT_LOG_LEVEL",
    "CLIKIT_LIVE_TRACES",
    "CLIKIT_LIVE_METRICS",
    "CLIKIT_OUT",
];

/// A `clikit` command with colour and `CLIKIT_*` variables cleared.
pub fn clikit() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("clikit").expect("clikit binary should be built");
    for var in AMBIENT_VARS {
        cmd.env_remove(var);
    }
    cmd
}

/// Write `contents` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("failed to write test file");
    path
}

/// Remove ANSI SGR sequences.
pub fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}
