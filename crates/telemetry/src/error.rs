//! Analytics error types.

use thiserror::Error;

/// Errors raised by durable record storage.
///
/// These are the only errors allowed to escape the reporter: losing a
/// consent change silently is worse than failing the caller.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("storage io error for '{key}': {source}")]
    Io {
        /// Record key
        key: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Record could not be serialized
    #[error("failed to encode record '{key}': {source}")]
    Encode {
        /// Record key
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Record on disk is not valid JSON or has the wrong shape
    #[error("failed to decode record '{key}': {source}")]
    Decode {
        /// Record key
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Record was written by a newer schema than we understand
    #[error("record '{key}' has version {found}, newest supported is {supported}")]
    UnsupportedVersion {
        key: String,
        found: u32,
        supported: u32,
    },

    /// Backend refused the write (used by in-memory stores)
    #[error("storage unavailable for '{key}'")]
    Unavailable { key: String },
}

impl StorageError {
    pub(crate) fn io(key: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            key: key.into(),
            source,
        }
    }
}

/// Transport-level failures while posting a payload.
///
/// A non-200 status is not a transport error; see
/// [`SubmitOutcome::Rejected`](crate::reporter::SubmitOutcome::Rejected).
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request did not complete in time
    #[error("request timed out")]
    Timeout,

    /// Could not connect (refused, DNS, TLS handshake)
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other failure while sending the request
    #[error("request failed: {0}")]
    Request(String),
}

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Scheduler channel is full (non-blocking send failed)
    #[error("analytics scheduler channel full, command dropped")]
    ChannelFull,

    /// Preference persistence failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_names_key() {
        let err = StorageError::io(
            "core.analytics",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("core.analytics"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_unsupported_version_message() {
        let err = StorageError::UnsupportedVersion {
            key: "core.analytics".to_string(),
            found: 3,
            supported: 1,
        };
        assert!(err.to_string().contains("version 3"));
    }

    #[test]
    fn test_storage_converts_into_analytics_error() {
        let err: AnalyticsError = StorageError::Unavailable {
            key: "core.analytics".to_string(),
        }
        .into();
        assert!(matches!(err, AnalyticsError::Storage(_)));
        assert!(err.to_string().contains("core.analytics"));
    }
}
