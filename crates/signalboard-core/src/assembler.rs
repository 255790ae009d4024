//! Dashboard assembly.
//!
//! Turns synthesized pages into the final [`DashboardDefinition`]: assigns
//! the name, stamps the permission level and keeps pages in planned order.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::BuilderConfig;
use crate::error::{Result, SignalboardError};
use crate::widgets::Widget;

/// Permission level of a dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permissions {
    /// Everyone in the account can view and edit.
    #[default]
    PublicReadWrite,
    /// Everyone can view, only the owner edits.
    PublicReadOnly,
    /// Only the owner can view.
    Private,
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PublicReadWrite => write!(f, "PUBLIC_READ_WRITE"),
            Self::PublicReadOnly => write!(f, "PUBLIC_READ_ONLY"),
            Self::Private => write!(f, "PRIVATE"),
        }
    }
}

/// A dashboard page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Page name.
    pub name: String,
    /// Page description.
    #[serde(default)]
    pub description: String,
    /// Widgets in placement order.
    #[serde(default)]
    pub widgets: Vec<Widget>,
}

impl Page {
    /// Creates an empty page.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            widgets: Vec::new(),
        }
    }
}

/// Terminal output of the pipeline, handed to the deployment collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardDefinition {
    /// Dashboard name.
    pub name: String,
    /// Dashboard description.
    pub description: String,
    /// Permission level.
    pub permissions: Permissions,
    /// Pages in order.
    pub pages: Vec<Page>,
}

impl DashboardDefinition {
    /// Total number of widgets across all pages.
    #[must_use]
    pub fn widget_count(&self) -> usize {
        self.pages.iter().map(|p| p.widgets.len()).sum()
    }

    /// Looks up a page by name.
    #[must_use]
    pub fn page(&self, name: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.name == name)
    }

    /// Serializes the definition as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Generated default name: `"<prefix> - <UTC date time>"`.
#[must_use]
pub fn default_name(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{prefix} - {}", now.format("%Y-%m-%d %H:%M:%S UTC"))
}

/// Assembles pages into a dashboard definition.
///
/// `title` wins over the configured name, which wins over a generated one.
///
/// # Errors
///
/// Returns [`SignalboardError::Defect`] if a page has no name or a page's
/// widgets overlap or leave the grid. Both mean an earlier stage is broken.
pub fn assemble(
    pages: Vec<Page>,
    title: Option<&str>,
    now: DateTime<Utc>,
    config: &BuilderConfig,
) -> Result<DashboardDefinition> {
    for (index, page) in pages.iter().enumerate() {
        if page.name.trim().is_empty() {
            return Err(SignalboardError::defect(format!(
                "page {index} has no name"
            )));
        }
        check_layout(page)?;
    }

    let name = title
        .map(str::to_string)
        .or_else(|| config.dashboard_name.clone())
        .unwrap_or_else(|| default_name(&config.name_prefix, now));

    let widgets: usize = pages.iter().map(|p| p.widgets.len()).sum();
    let description = format!(
        "Generated from discovered telemetry: {} pages, {widgets} widgets",
        pages.len()
    );

    let definition = DashboardDefinition {
        name,
        description,
        permissions: config.permissions,
        pages,
    };

    info!(
        name = %definition.name,
        pages = definition.pages.len(),
        widgets,
        "Dashboard assembled"
    );

    Ok(definition)
}

fn check_layout(page: &Page) -> Result<()> {
    for (i, widget) in page.widgets.iter().enumerate() {
        if !widget.layout.fits_grid() {
            return Err(SignalboardError::defect(format!(
                "widget '{}' on page '{}' leaves the grid",
                widget.title, page.name
            )));
        }
        if let Some(other) = page.widgets[..i]
            .iter()
            .find(|other| other.layout.overlaps(&widget.layout))
        {
            return Err(SignalboardError::defect(format!(
                "widgets '{}' and '{}' overlap on page '{}'",
                other.title, widget.title, page.name
            )));
        }
    }
    Ok(())
}
