//! Contract with the telemetry backend.
//!
//! The pipeline never talks to the network itself. Query execution and
//! dashboard creation go through a [`DashboardCollaborator`], injected by the
//! caller: a live client in production, [`NullCollaborator`] offline and in
//! tests. Retries and timeouts belong to the implementation.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::assembler::DashboardDefinition;
use crate::error::CollaboratorError;
use crate::types::AccountId;

/// Base URL dashboards are linked under.
pub const DASHBOARD_BASE_URL: &str = "https://one.newrelic.com/dashboards";

/// Rows returned by a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Result rows as returned by the backend.
    pub results: Vec<serde_json::Value>,
}

/// A dashboard created by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedDashboard {
    /// Backend identifier.
    pub guid: String,
    /// Dashboard name as stored.
    pub name: String,
    /// Link to the dashboard.
    pub url: String,
}

/// Link to a dashboard by GUID.
#[must_use]
pub fn dashboard_url(guid: &str) -> String {
    format!("{DASHBOARD_BASE_URL}/{guid}")
}

/// Telemetry backend operations the pipeline depends on.
///
/// This trait allows for testing with fake implementations.
pub trait DashboardCollaborator: Send + Sync {
    /// Executes a query against an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects the query.
    fn execute_query(
        &self,
        account_id: AccountId,
        query: &str,
    ) -> impl Future<Output = Result<QueryResponse, CollaboratorError>> + Send;

    /// Creates a dashboard in an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects the definition.
    fn create_dashboard(
        &self,
        account_id: AccountId,
        definition: &DashboardDefinition,
    ) -> impl Future<Output = Result<DeployedDashboard, CollaboratorError>> + Send;
}

/// Offline collaborator: queries return no rows, dashboards get a mock GUID.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCollaborator;

impl DashboardCollaborator for NullCollaborator {
    async fn execute_query(
        &self,
        account_id: AccountId,
        query: &str,
    ) -> Result<QueryResponse, CollaboratorError> {
        debug!(account = %account_id, query, "Offline query skipped");
        Ok(QueryResponse::default())
    }

    async fn create_dashboard(
        &self,
        account_id: AccountId,
        definition: &DashboardDefinition,
    ) -> Result<DeployedDashboard, CollaboratorError> {
        let guid = format!("OFFLINE-{}", Uuid::new_v4());
        debug!(account = %account_id, guid = %guid, "Offline dashboard not deployed");
        Ok(DeployedDashboard {
            url: dashboard_url(&guid),
            guid,
            name: definition.name.clone(),
        })
    }
}

/// A widget query the backend rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFailure {
    /// Page holding the widget.
    pub page: String,
    /// Widget title.
    pub widget: String,
    /// Query text.
    pub query: String,
    /// Error reported by the collaborator.
    pub error: String,
}

/// Outcome of validating every widget query of a definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Number of queries executed.
    pub checked: usize,
    /// Queries that failed.
    pub failures: Vec<QueryFailure>,
}

impl ValidationReport {
    /// Returns true if every query succeeded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Executes every widget query through the collaborator.
///
/// Failures are collected, not propagated, so one bad query does not hide
/// the rest.
pub async fn validate_queries<C: DashboardCollaborator>(
    collaborator: &C,
    definition: &DashboardDefinition,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    for page in &definition.pages {
        for widget in &page.widgets {
            for nrql in &widget.raw_configuration.nrql_queries {
                report.checked += 1;
                if let Err(e) = collaborator.execute_query(nrql.account_id, &nrql.query).await {
                    warn!(
                        page = %page.name,
                        widget = %widget.title,
                        error = %e,
                        "Widget query failed validation"
                    );
                    report.failures.push(QueryFailure {
                        page: page.name.clone(),
                        widget: widget.title.clone(),
                        query: nrql.query.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::{Page, Permissions};
    use crate::layout::Layout;
    use crate::visualization::Visualization;
    use crate::widgets::{NrqlQuery, Widget};

    /// Rejects every query containing a marker string.
    struct RejectingCollaborator {
        marker: &'static str,
    }

    impl DashboardCollaborator for RejectingCollaborator {
        async fn execute_query(
            &self,
            _account_id: AccountId,
            query: &str,
        ) -> Result<QueryResponse, CollaboratorError> {
            if query.contains(self.marker) {
                Err(CollaboratorError::Api {
                    message: "NRQL Syntax Error".to_string(),
                })
            } else {
                Ok(QueryResponse {
                    results: vec![serde_json::json!({ "count": 1 })],
                })
            }
        }

        async fn create_dashboard(
            &self,
            _account_id: AccountId,
            _definition: &DashboardDefinition,
        ) -> Result<DeployedDashboard, CollaboratorError> {
            Err(CollaboratorError::Auth("read-only key".to_string()))
        }
    }

    fn definition(queries: &[&str]) -> DashboardDefinition {
        let mut page = Page::new("Overview", "");
        for (i, query) in queries.iter().enumerate() {
            page.widgets.push(Widget::chart(
                format!("w{i}"),
                Visualization::Line,
                Layout {
                    column: 1,
                    row: 1 + 3 * i as u32,
                    height: 3,
                    width: 6,
                },
                vec![NrqlQuery {
                    account_id: AccountId(1),
                    query: (*query).to_string(),
                }],
            ));
        }
        DashboardDefinition {
            name: "Test".to_string(),
            description: String::new(),
            permissions: Permissions::default(),
            pages: vec![page],
        }
    }

    #[tokio::test]
    async fn null_collaborator_returns_mock_dashboard() {
        let deployed = NullCollaborator
            .create_dashboard(AccountId(1), &definition(&[]))
            .await
            .unwrap();
        assert!(deployed.guid.starts_with("OFFLINE-"));
        assert_eq!(deployed.name, "Test");
        assert_eq!(deployed.url, dashboard_url(&deployed.guid));
    }

    #[tokio::test]
    async fn null_collaborator_returns_no_rows() {
        let response = NullCollaborator
            .execute_query(AccountId(1), "SELECT count(*) FROM Transaction")
            .await
            .unwrap();
        assert!(response.results.is_empty());
    }

    #[tokio::test]
    async fn validation_collects_every_failure() {
        let collaborator = RejectingCollaborator { marker: "bad" };
        let report = validate_queries(
            &collaborator,
            &definition(&["SELECT bad", "SELECT good", "SELECT bad again"]),
        )
        .await;

        assert_eq!(report.checked, 3);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].widget, "w0");
        assert_eq!(report.failures[1].query, "SELECT bad again");
        assert!(report.failures[0].error.contains("NRQL Syntax Error"));
        assert!(!report.is_valid());
    }

    #[tokio::test]
    async fn validation_against_null_collaborator_passes() {
        let report = validate_queries(&NullCollaborator, &definition(&["SELECT 1"])).await;
        assert!(report.is_valid());
        assert_eq!(report.checked, 1);
    }
}
