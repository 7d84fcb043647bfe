//! Logging configuration
//!
//! Controls how the reporter's log lines are emitted. Every submission
//! outcome ends up here, so this is the reporter's only user-visible
//! surface.

use serde::Deserialize;

/// Log level
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    /// Successful submissions and their payloads (default)
    #[default]
    Info,
    /// Rejected submissions
    Warn,
    /// Timeouts and transport failures only
    Error,
}

impl LogLevel {
    /// Convert to tracing level filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console output (default)
    #[default]
    Console,
    /// One JSON object per line
    Json,
}

/// Logging configuration
///
/// # Example
///
/// ```toml
/// [log]
/// level = "info"
/// format = "json"
/// directives = ["hass_telemetry=debug"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Base log level
    pub level: LogLevel,

    /// Output format
    pub format: LogFormat,

    /// Extra per-target filter directives (`target=level`)
    pub directives: Vec<String>,
}

impl LogConfig {
    /// Full filter string: base level followed by the extra directives
    pub fn filter(&self) -> String {
        Self::filter_with(self.level.as_str(), &self.directives)
    }

    /// Filter string with the base level overridden (e.g. from a CLI flag)
    pub fn filter_with(level: &str, directives: &[String]) -> String {
        std::iter::once(level)
            .chain(directives.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(",")
    }
}
