// observability/tracing_setup.rs - Tracing Configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Tracing output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingFormat {
    /// Human-readable format (default)
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for TracingFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(TracingFormat::Pretty),
            "compact" => Ok(TracingFormat::Compact),
            "json" => Ok(TracingFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Configuration for tracing
#[derive(Clone, Debug)]
pub struct TracingConfig {
    /// Log level filter (e.g., "info", "debug", "travos_trust=trace")
    pub filter: String,

    /// Output format
    pub format: TracingFormat,

    /// Include span events (new, close)
    pub with_span_events: bool,

    /// Include file and line numbers
    pub with_file: bool,

    /// Include target (module path)
    pub with_target: bool,

    /// Include thread IDs
    pub with_thread_ids: bool,

    /// ANSI colors (for terminal output)
    pub with_ansi: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            filter: "info,travos_trust=debug".into(),
            format: TracingFormat::Pretty,
            with_span_events: false,
            with_file: false,
            with_target: true,
            with_thread_ids: false,
            with_ansi: true,
        }
    }
}

impl TracingConfig {
    /// Config derived from a level name and an output format.
    ///
    /// Debug and trace levels also turn on span events and source locations.
    pub fn for_level(level: &str, format: TracingFormat) -> Self {
        let verbose = matches!(level, "debug" | "trace");
        Self {
            filter: format!("{},travos_trust={}", level, level),
            format,
            with_span_events: verbose,
            with_file: verbose,
            with_target: true,
            with_thread_ids: level == "trace",
            with_ansi: format != TracingFormat::Json,
        }
    }
}

/// Initialize the tracing subscriber
///
/// This should be called once at application startup. `RUST_LOG` takes
/// precedence over the configured filter.
pub fn init_tracing(config: TracingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let span_events = if config.with_span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    match config.format {
        TracingFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_span_events(span_events)
                .with_file(config.with_file)
                .with_line_number(config.with_file)
                .with_target(config.with_target)
                .with_thread_ids(config.with_thread_ids)
                .with_ansi(config.with_ansi);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .init();
        }
        TracingFormat::Compact => {
            let fmt_layer = fmt::layer()
                .compact()
                .with_span_events(span_events)
                .with_file(config.with_file)
                .with_line_number(config.with_file)
                .with_target(config.with_target)
                .with_thread_ids(config.with_thread_ids)
                .with_ansi(config.with_ansi);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .init();
        }
        TracingFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_span_events(span_events)
                .with_file(config.with_file)
                .with_line_number(config.with_file)
                .with_target(config.with_target)
                .with_thread_ids(config.with_thread_ids);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .init();
        }
    }

    tracing::info!(
        filter = %config.filter,
        format = ?config.format,
        "Tracing initialized"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_config_default() {
        let config = TracingConfig::default();
        assert!(config.filter.contains("info"));
        assert!(config.with_ansi);
    }

    #[test]
    fn test_for_level() {
        let config = TracingConfig::for_level("debug", TracingFormat::Compact);
        assert_eq!(config.filter, "debug,travos_trust=debug");
        assert!(config.with_span_events);
        assert!(config.with_ansi);

        let config = TracingConfig::for_level("warn", TracingFormat::Json);
        assert!(!config.with_file);
        assert!(!config.with_ansi);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<TracingFormat>().unwrap(), TracingFormat::Json);
        assert_eq!("compact".parse::<TracingFormat>().unwrap(), TracingFormat::Compact);
        assert!("xml".parse::<TracingFormat>().is_err());
    }
}
