//! CLI error types.

use std::fmt;

use signalboard_core::{CollaboratorError, SignalboardError};

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Invalid configuration.
    Config(String),
    /// Output formatting error.
    Format(String),
    /// Invalid argument.
    InvalidArgument(String),
    /// Pipeline error.
    Core(SignalboardError),
    /// Backend call failed.
    Collaborator(CollaboratorError),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::Core(e) => write!(f, "{e}"),
            Self::Collaborator(e) => write!(f, "backend error: {e}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Core(e) => Some(e),
            Self::Collaborator(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<SignalboardError> for CliError {
    fn from(err: SignalboardError) -> Self {
        Self::Core(err)
    }
}

impl From<CollaboratorError> for CliError {
    fn from(err: CollaboratorError) -> Self {
        Self::Collaborator(err)
    }
}
