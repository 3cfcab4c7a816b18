//! Tracing setup driven by the standard telemetry environment variables.
//!
//! Output always goes to stderr through `tracing-subscriber`; no collector
//! connection is made. The collector endpoint is carried in the config and
//! reported once the subscriber is installed.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use crate::env::{EnvErrors, EnvReader, env_var_name};

pub const SERVICE_NAME_VAR: &str = "OTEL_SERVICE_NAME";
pub const ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

const DEFAULT_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "kebab-case")]
pub struct TelemetryConfig {
    /// Name reported for this process.
    pub service_name: String,
    /// Collector endpoint, if one is configured.
    pub endpoint: Option<String>,
    /// Log span open and close events.
    pub live_traces: bool,
    pub live_metrics: bool,
    /// `EnvFilter` directives, e.g. `info` or `clikit=debug`.
    pub filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: env!("CARGO_PKG_NAME").to_string(),
            endpoint: None,
            live_traces: false,
            live_metrics: false,
            filter: DEFAULT_FILTER.to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`EnvErrors`] listing every variable that failed to parse.
    pub fn from_env(prefix: &str, service: &str) -> Result<Self, EnvErrors> {
        Self::from_reader(prefix, service, EnvReader::from_process())
    }

    /// Read the configuration through `lookup`.
    ///
    /// `OTEL_SERVICE_NAME` overrides `service`. The toggles and the filter
    /// are read from `<PREFIX>_LIVE_TRACES`, `<PREFIX>_LIVE_METRICS` and
    /// `<PREFIX>_LOG_LEVEL`, the variable bound to a `--log-level` flag.
    ///
    /// # Errors
    /// Returns [`EnvErrors`] listing every variable that failed to parse.
    pub fn from_lookup<L>(prefix: &str, service: &str, lookup: L) -> Result<Self, EnvErrors>
    where
        L: Fn(&str) -> Option<String>,
    {
        Self::from_reader(prefix, service, EnvReader::new(lookup))
    }

    fn from_reader<L>(prefix: &str, service: &str, mut env: EnvReader<L>) -> Result<Self, EnvErrors>
    where
        L: Fn(&str) -> Option<String>,
    {
        let non_empty = |v: String| (!v.trim().is_empty()).then_some(v);
        let config = Self {
            service_name: env
                .string(SERVICE_NAME_VAR)
                .and_then(non_empty)
                .unwrap_or_else(|| service.to_string()),
            endpoint: env.string(ENDPOINT_VAR).and_then(non_empty),
            live_traces: env
                .bool(&env_var_name(prefix, "live-traces"))
                .unwrap_or(false),
            live_metrics: env
                .bool(&env_var_name(prefix, "live-metrics"))
                .unwrap_or(false),
            filter: env
                .string(&env_var_name(prefix, "log-level"))
                .and_then(non_empty)
                .unwrap_or_else(|| DEFAULT_FILTER.to_string()),
        };
        env.finish()?;
        Ok(config)
    }

    /// Replace the filter directives.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter {filter:?}")]
    Filter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("failed to install the tracing subscriber")]
    Install(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// Install the global subscriber described by `config`.
///
/// # Errors
/// Returns [`TelemetryError`] if the filter is invalid or a global
/// subscriber is already installed.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(&config.filter).map_err(|source| TelemetryError::Filter {
        filter: config.filter.clone(),
        source,
    })?;
    let span_events = if config.live_traces {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_span_events(span_events)
        .try_init()
        .map_err(TelemetryError::Install)?;
    tracing::debug!(
        service = %config.service_name,
        endpoint = config.endpoint.as_deref().unwrap_or("none"),
        live_traces = config.live_traces,
        live_metrics = config.live_metrics,
        "telemetry initialised"
    );
    Ok(())
}
