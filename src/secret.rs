//! Resolution of secret values from the environment, files or commands.
//!
//! A source is written `scheme:rest`:
//!
//! - `env:NAME` reads an environment variable, which must be set;
//! - `file:PATH` reads a file, dropping the trailing newline;
//! - `cmd:COMMAND` runs `sh -c COMMAND` and takes its trimmed stdout. The
//!   command is killed if it outlives the resolver's timeout.
//!
//! Values are never logged.

use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
    process::{Command, ExitStatus, Stdio},
    str::FromStr,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use thiserror::Error;

/// Default limit for `cmd:` sources.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A parsed secret source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    Env(String),
    File(PathBuf),
    Cmd(String),
}

impl SecretSource {
    #[must_use]
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Env(_) => "env",
            Self::File(_) => "file",
            Self::Cmd(_) => "cmd",
        }
    }
}

impl FromStr for SecretSource {
    type Err = SecretError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unsupported = || SecretError::UnsupportedScheme {
            input: s.to_string(),
        };
        let (scheme, rest) = s.split_once(':').ok_or_else(unsupported)?;
        match scheme {
            "env" => Ok(Self::Env(rest.to_string())),
            "file" => Ok(Self::File(PathBuf::from(rest))),
            "cmd" => Ok(Self::Cmd(rest.to_string())),
            _ => Err(unsupported()),
        }
    }
}

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("unsupported secret source {input:?}: expected env:, file: or cmd:")]
    UnsupportedScheme { input: String },
    #[error("environment variable {0} is not set")]
    MissingVariable(String),
    #[error("failed to read secret file {}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to run secret command {command:?}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("secret command {command:?} failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("secret command {command:?} timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },
}

/// Resolves secret sources with a bounded command timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretResolver {
    timeout: Duration,
}

impl Default for SecretResolver {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SecretResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Parse and resolve `source`.
    ///
    /// # Errors
    /// Returns [`SecretError`] for an unknown scheme or when the value cannot
    /// be obtained.
    pub fn resolve(&self, source: &str) -> Result<String, SecretError> {
        self.resolve_source(&source.parse()?)
    }

    /// Resolve an already parsed source.
    ///
    /// # Errors
    /// Returns [`SecretError`] when the value cannot be obtained.
    pub fn resolve_source(&self, source: &SecretSource) -> Result<String, SecretError> {
        let value = match source {
            SecretSource::Env(name) => {
                std::env::var(name).map_err(|_| SecretError::MissingVariable(name.clone()))?
            }
            SecretSource::File(path) => fs::read_to_string(path)
                .map(|text| text.trim_end_matches(['\r', '\n']).to_string())
                .map_err(|source| SecretError::File {
                    path: path.clone(),
                    source,
                })?,
            SecretSource::Cmd(command) => self.run(command)?,
        };
        tracing::debug!(scheme = source.scheme(), "resolved secret");
        Ok(value)
    }

    fn run(&self, command: &str) -> Result<String, SecretError> {
        let spawn_error = |source| SecretError::Spawn {
            command: command.to_string(),
            source,
        };
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait().map_err(spawn_error)? {
                break status;
            }
            if Instant::now() >= deadline {
                // The child may already have exited; either way it is reaped.
                let _ = child.kill();
                let _ = child.wait();
                tracing::debug!(timeout = ?self.timeout, "secret command timed out");
                return Err(SecretError::Timeout {
                    command: command.to_string(),
                    timeout: self.timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        };

        let stdout = collect(stdout);
        if !status.success() {
            return Err(SecretError::Failed {
                command: command.to_string(),
                status,
                stderr: collect(stderr).trim().to_string(),
            });
        }
        Ok(stdout.trim().to_string())
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}
