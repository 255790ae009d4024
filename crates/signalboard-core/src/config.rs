//! Builder configuration.
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration. Files are validated after parsing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assembler::Permissions;
use crate::error::{Result, SignalboardError};
use crate::taxonomy::{Taxonomy, TaxonomyOverrides};

/// Default prefix of generated dashboard names.
pub const DEFAULT_NAME_PREFIX: &str = "Intelligent Dashboard";

/// Configuration for [`DashboardBuilder`](crate::DashboardBuilder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Caller-supplied dashboard name. Generated from `name_prefix` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_name: Option<String>,
    /// Prefix of the generated default name.
    pub name_prefix: String,
    /// Permission level stamped on the definition.
    pub permissions: Permissions,
    /// Maximum items aggregated by one widget. Larger groups are split.
    pub max_items_per_widget: usize,
    /// SINCE window of category and signal widgets.
    pub since: String,
    /// SINCE window of the catalog summary table.
    pub table_since: String,
    /// LIMIT of the catalog summary table.
    pub table_limit: u32,
    /// Attributes per event type shown in the summary table.
    pub table_items_per_source: usize,
    /// Categories featured on the overview page.
    pub max_headline_categories: usize,
    /// Correlation widgets on the correlations page.
    pub max_correlation_widgets: usize,
    /// Whether to run the correlation detector.
    pub enable_correlations: bool,
    /// Optional taxonomy overrides.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxonomy: Option<TaxonomyOverrides>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            dashboard_name: None,
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            permissions: Permissions::default(),
            max_items_per_widget: 5,
            since: "1 hour ago".to_string(),
            table_since: "5 minutes ago".to_string(),
            table_limit: 100,
            table_items_per_source: 3,
            max_headline_categories: 3,
            max_correlation_widgets: 10,
            enable_correlations: true,
            taxonomy: None,
        }
    }
}

impl BuilderConfig {
    /// Load configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            SignalboardError::config(format!(
                "failed to read config file '{}': {e}",
                path.as_ref().display()
            ))
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or a value is out of range.
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| SignalboardError::config(format!("invalid JSON: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.max_items_per_widget == 0 {
            return Err(SignalboardError::config(
                "max_items_per_widget must be greater than 0",
            ));
        }

        if self.table_items_per_source == 0 {
            return Err(SignalboardError::config(
                "table_items_per_source must be greater than 0",
            ));
        }

        if self.table_limit == 0 {
            return Err(SignalboardError::config(
                "table_limit must be greater than 0",
            ));
        }

        if self.since.trim().is_empty() || self.table_since.trim().is_empty() {
            return Err(SignalboardError::config("since windows cannot be empty"));
        }

        if self
            .dashboard_name
            .as_ref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(SignalboardError::config("dashboard_name cannot be blank"));
        }

        if self.name_prefix.trim().is_empty() {
            return Err(SignalboardError::config("name_prefix cannot be empty"));
        }

        Ok(())
    }

    /// Builds the taxonomy this configuration asks for.
    ///
    /// # Errors
    ///
    /// Returns an error if an override pattern is invalid.
    pub fn taxonomy(&self) -> Result<Taxonomy> {
        match &self.taxonomy {
            Some(overrides) => Taxonomy::with_overrides(overrides),
            None => Taxonomy::standard(),
        }
    }

    /// Sets the dashboard name.
    #[must_use]
    pub fn with_dashboard_name(mut self, name: impl Into<String>) -> Self {
        self.dashboard_name = Some(name.into());
        self
    }

    /// Sets the permission level.
    #[must_use]
    pub const fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    /// Sets the per-widget item cap.
    #[must_use]
    pub const fn with_max_items_per_widget(mut self, max: usize) -> Self {
        self.max_items_per_widget = max;
        self
    }

    /// Enables or disables correlation detection.
    #[must_use]
    pub const fn with_correlations(mut self, enabled: bool) -> Self {
        self.enable_correlations = enabled;
        self
    }

    /// Sets taxonomy overrides.
    #[must_use]
    pub fn with_taxonomy(mut self, overrides: TaxonomyOverrides) -> Self {
        self.taxonomy = Some(overrides);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("failed to write temp file");
        file
    }

    #[test]
    fn empty_object_gives_defaults() {
        let config = BuilderConfig::from_json("{}").expect("should parse empty config");
        assert_eq!(config, BuilderConfig::default());
        assert_eq!(config.max_items_per_widget, 5);
        assert_eq!(config.since, "1 hour ago");
        assert_eq!(config.permissions, Permissions::PublicReadWrite);
    }

    #[test]
    fn parses_full_config() {
        let json = r#"{
            "dashboard_name": "Kafka Overview",
            "permissions": "PRIVATE",
            "max_items_per_widget": 3,
            "since": "30 minutes ago",
            "enable_correlations": false,
            "taxonomy": {
                "patterns": { "business": "widget|gizmo" }
            }
        }"#;

        let config = BuilderConfig::from_json(json).expect("should parse full config");
        assert_eq!(config.dashboard_name.as_deref(), Some("Kafka Overview"));
        assert_eq!(config.permissions, Permissions::Private);
        assert_eq!(config.max_items_per_widget, 3);
        assert!(!config.enable_correlations);

        let taxonomy = config.taxonomy().expect("overrides should compile");
        assert_eq!(taxonomy.classify("gizmoSales"), Category::Business);
    }

    #[test]
    fn zero_item_cap_is_rejected() {
        let result = BuilderConfig::from_json(r#"{"max_items_per_widget": 0}"#);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("max_items_per_widget"));
    }

    #[test]
    fn blank_dashboard_name_is_rejected() {
        let config = BuilderConfig::default().with_dashboard_name("   ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        let result = BuilderConfig::from_json("{ not json");
        assert!(matches!(result, Err(SignalboardError::Config { .. })));
    }

    #[test]
    fn invalid_override_pattern_fails_taxonomy() {
        let config = BuilderConfig::from_json(r#"{"taxonomy": {"patterns": {"latency": "("}}}"#)
            .expect("pattern is only compiled on demand");
        assert!(matches!(
            config.taxonomy(),
            Err(SignalboardError::Taxonomy { .. })
        ));
    }

    #[test]
    fn loads_from_file() {
        let file = create_temp_config(r#"{"table_limit": 25}"#);
        let config = BuilderConfig::from_file(file.path()).expect("should load file");
        assert_eq!(config.table_limit, 25);
    }

    #[test]
    fn missing_file_is_reported() {
        let result = BuilderConfig::from_file("/nonexistent/signalboard.json");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
