//! Error types for the signalboard-core crate.

use thiserror::Error;

/// Errors that can occur while building a dashboard definition.
///
/// Classification and signal mapping never produce these; they are reserved
/// for configuration problems and violated internal invariants.
#[derive(Debug, Error)]
pub enum SignalboardError {
    /// The taxonomy could not be constructed (bad pattern or missing rule).
    #[error("invalid taxonomy: {reason}")]
    Taxonomy {
        /// The reason the taxonomy is invalid.
        reason: String,
    },

    /// A configuration value is out of range or malformed.
    #[error("configuration error: {reason}")]
    Config {
        /// The reason the configuration was rejected.
        reason: String,
    },

    /// An internal invariant was violated. Always a bug, never user input.
    #[error("internal defect: {reason}")]
    Defect {
        /// Description of the violated invariant.
        reason: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading a configuration or snapshot file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SignalboardError {
    /// Shorthand for a [`SignalboardError::Defect`].
    pub(crate) fn defect(reason: impl Into<String>) -> Self {
        Self::Defect {
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`SignalboardError::Taxonomy`].
    pub(crate) fn taxonomy(reason: impl Into<String>) -> Self {
        Self::Taxonomy {
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`SignalboardError::Config`].
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

/// Errors reported by a telemetry backend collaborator.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The request never reached the backend or the connection failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend rejected the credentials.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The backend accepted the request but reported an error.
    #[error("api error: {message}")]
    Api {
        /// Error message returned by the backend.
        message: String,
    },

    /// The backend returned a payload that could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for signalboard operations.
pub type Result<T> = std::result::Result<T, SignalboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_taxonomy() {
        let err = SignalboardError::taxonomy("no rule for latency");
        assert_eq!(err.to_string(), "invalid taxonomy: no rule for latency");
    }

    #[test]
    fn error_display_config() {
        let err = SignalboardError::config("max_items_per_widget must be at least 1");
        assert_eq!(
            err.to_string(),
            "configuration error: max_items_per_widget must be at least 1"
        );
    }

    #[test]
    fn error_display_defect() {
        let err = SignalboardError::defect("page without a name");
        assert_eq!(err.to_string(), "internal defect: page without a name");
    }

    #[test]
    fn error_from_serde_error() {
        let serde_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err = SignalboardError::from(serde_err);
        assert!(matches!(err, SignalboardError::Serialization(_)));
    }

    #[test]
    fn error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = SignalboardError::from(io_err);
        assert!(matches!(err, SignalboardError::Io(_)));
    }

    #[test]
    fn collaborator_error_display() {
        let err = CollaboratorError::Api {
            message: "dashboard name taken".to_string(),
        };
        assert_eq!(err.to_string(), "api error: dashboard name taken");

        let err = CollaboratorError::Auth("bad key".to_string());
        assert_eq!(err.to_string(), "authentication failed: bad key");
    }
}
