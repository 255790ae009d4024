//! CLI command implementations.
//!
//! Each submodule implements a specific CLI command:
//! - [`classify`] - Category and golden signals of individual names
//! - [`analyze`] - Snapshot analysis, correlations and insights
//! - [`build`] - Dashboard synthesis, validation and deployment

pub mod analyze;
pub mod build;
pub mod classify;

pub use analyze::AnalyzeCommand;
pub use build::BuildCommand;
pub use classify::ClassifyCommand;

use std::path::Path;

use signalboard_core::{AccountId, BuilderConfig, DiscoverySnapshot};
use tracing::debug;

use crate::error::CliError;

/// Loads the builder configuration, falling back to defaults.
///
/// # Errors
///
/// Returns an error if the file cannot be read or holds an invalid configuration.
pub fn load_config(path: Option<&Path>) -> Result<BuilderConfig, CliError> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading configuration");
            BuilderConfig::from_file(path).map_err(|e| CliError::Config(e.to_string()))
        }
        None => Ok(BuilderConfig::default()),
    }
}

/// Loads a discovery snapshot, optionally re-targeting it at another account.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a snapshot.
pub fn load_snapshot(path: &Path, account_id: Option<u64>) -> Result<DiscoverySnapshot, CliError> {
    let content = std::fs::read_to_string(path)?;
    let mut snapshot = DiscoverySnapshot::from_json(&content).map_err(|e| {
        CliError::InvalidArgument(format!("{} is not a discovery snapshot: {e}", path.display()))
    })?;
    if let Some(id) = account_id {
        snapshot.account_id = AccountId(id);
    }
    debug!(
        account = %snapshot.account_id,
        event_types = snapshot.event_types.len(),
        metrics = snapshot.metrics.len(),
        "Snapshot loaded"
    );
    Ok(snapshot)
}
