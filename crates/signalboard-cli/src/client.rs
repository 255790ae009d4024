//! Live backend collaborator over the NerdGraph GraphQL API.

use reqwest::StatusCode;
use serde_json::{Value, json};
use tracing::debug;

use signalboard_core::collaborator::dashboard_url;
use signalboard_core::{
    AccountId, CollaboratorError, DashboardCollaborator, DashboardDefinition, DeployedDashboard,
    QueryResponse,
};

use crate::cli::Region;

const US_ENDPOINT: &str = "https://api.newrelic.com/graphql";
const EU_ENDPOINT: &str = "https://api.eu.newrelic.com/graphql";

const NRQL_QUERY: &str = "query($accountId: Int!, $nrql: Nrql!) { \
    actor { account(id: $accountId) { nrql(query: $nrql) { results } } } }";

const DASHBOARD_CREATE: &str = "mutation($accountId: Int!, $dashboard: DashboardInput!) { \
    dashboardCreate(accountId: $accountId, dashboard: $dashboard) { \
    entityResult { guid name } errors { description type } } }";

/// GraphQL endpoint of a region.
#[must_use]
pub const fn endpoint(region: Region) -> &'static str {
    match region {
        Region::Us => US_ENDPOINT,
        Region::Eu => EU_ENDPOINT,
    }
}

/// NerdGraph client authenticated with a user API key.
#[derive(Debug, Clone)]
pub struct NerdGraphClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl NerdGraphClient {
    /// Creates a client for a region.
    #[must_use]
    pub fn new(api_key: impl Into<String>, region: Region) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint(region).to_string(),
            api_key: api_key.into(),
        }
    }

    /// Overrides the endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Endpoint requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn graphql(&self, query: &str, variables: Value) -> Result<Value, CollaboratorError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("API-Key", &self.api_key)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| CollaboratorError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CollaboratorError::Auth(format!("backend returned {status}")));
        }
        if !status.is_success() {
            return Err(CollaboratorError::Api {
                message: format!("backend returned {status}"),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse(e.to_string()))?;

        if let Some(message) = graphql_error(&body) {
            return Err(CollaboratorError::Api { message });
        }
        Ok(body)
    }
}

impl DashboardCollaborator for NerdGraphClient {
    async fn execute_query(
        &self,
        account_id: AccountId,
        query: &str,
    ) -> Result<QueryResponse, CollaboratorError> {
        debug!(account = %account_id, query, "Executing query");
        let body = self
            .graphql(NRQL_QUERY, json!({ "accountId": account_id.get(), "nrql": query }))
            .await?;
        parse_query_response(&body)
    }

    async fn create_dashboard(
        &self,
        account_id: AccountId,
        definition: &DashboardDefinition,
    ) -> Result<DeployedDashboard, CollaboratorError> {
        let dashboard = serde_json::to_value(definition)
            .map_err(|e| CollaboratorError::InvalidResponse(e.to_string()))?;
        debug!(account = %account_id, name = %definition.name, "Creating dashboard");
        let body = self
            .graphql(
                DASHBOARD_CREATE,
                json!({ "accountId": account_id.get(), "dashboard": dashboard }),
            )
            .await?;
        parse_dashboard_response(&body)
    }
}

/// Joined messages of a GraphQL `errors` array, if any.
fn graphql_error(body: &Value) -> Option<String> {
    let errors = body.get("errors")?.as_array()?;
    if errors.is_empty() {
        return None;
    }
    let messages: Vec<&str> = errors
        .iter()
        .filter_map(|e| e.get("message").and_then(Value::as_str))
        .collect();
    Some(if messages.is_empty() {
        "unknown GraphQL error".to_string()
    } else {
        messages.join("; ")
    })
}

fn parse_query_response(body: &Value) -> Result<QueryResponse, CollaboratorError> {
    let results = body
        .pointer("/data/actor/account/nrql/results")
        .and_then(Value::as_array)
        .ok_or_else(|| CollaboratorError::InvalidResponse("missing nrql results".to_string()))?;
    Ok(QueryResponse {
        results: results.clone(),
    })
}

fn parse_dashboard_response(body: &Value) -> Result<DeployedDashboard, CollaboratorError> {
    let created = body
        .pointer("/data/dashboardCreate")
        .ok_or_else(|| CollaboratorError::InvalidResponse("missing dashboardCreate".to_string()))?;

    if let Some(errors) = created.get("errors").and_then(Value::as_array) {
        let descriptions: Vec<&str> = errors
            .iter()
            .filter_map(|e| e.get("description").and_then(Value::as_str))
            .collect();
        if !descriptions.is_empty() {
            return Err(CollaboratorError::Api {
                message: descriptions.join("; "),
            });
        }
    }

    let entity = created
        .get("entityResult")
        .filter(|v| !v.is_null())
        .ok_or_else(|| CollaboratorError::InvalidResponse("missing entityResult".to_string()))?;
    let guid = entity
        .get("guid")
        .and_then(Value::as_str)
        .ok_or_else(|| CollaboratorError::InvalidResponse("missing guid".to_string()))?;
    let name = entity.get("name").and_then(Value::as_str).unwrap_or_default();

    Ok(DeployedDashboard {
        guid: guid.to_string(),
        name: name.to_string(),
        url: dashboard_url(guid),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_endpoints() {
        assert_eq!(endpoint(Region::Us), "https://api.newrelic.com/graphql");
        assert_eq!(endpoint(Region::Eu), "https://api.eu.newrelic.com/graphql");
        let client = NerdGraphClient::new("key", Region::Eu).with_endpoint("http://localhost:1");
        assert_eq!(client.endpoint(), "http://localhost:1");
    }

    mod response_tests {
        use super::*;

        #[test]
        fn graphql_errors_are_joined() {
            let body = json!({ "errors": [{ "message": "bad" }, { "message": "worse" }] });
            assert_eq!(graphql_error(&body).as_deref(), Some("bad; worse"));
            assert!(graphql_error(&json!({ "errors": [] })).is_none());
            assert!(graphql_error(&json!({ "data": {} })).is_none());
        }

        #[test]
        fn query_results_are_extracted() {
            let body = json!({
                "data": { "actor": { "account": { "nrql": { "results": [{ "count": 3 }] } } } }
            });
            let response = parse_query_response(&body).unwrap();
            assert_eq!(response.results, vec![json!({ "count": 3 })]);
        }

        #[test]
        fn missing_results_are_invalid() {
            let err = parse_query_response(&json!({ "data": null })).unwrap_err();
            assert!(matches!(err, CollaboratorError::InvalidResponse(_)));
        }

        #[test]
        fn dashboard_guid_becomes_url() {
            let body = json!({
                "data": { "dashboardCreate": {
                    "entityResult": { "guid": "MXxWSVp8", "name": "Kafka" },
                    "errors": []
                } }
            });
            let deployed = parse_dashboard_response(&body).unwrap();
            assert_eq!(deployed.guid, "MXxWSVp8");
            assert_eq!(deployed.name, "Kafka");
            assert_eq!(deployed.url, "https://one.newrelic.com/dashboards/MXxWSVp8");
        }

        #[test]
        fn dashboard_errors_are_api_errors() {
            let body = json!({
                "data": { "dashboardCreate": {
                    "entityResult": null,
                    "errors": [{ "description": "Invalid widget", "type": "INVALID_INPUT" }]
                } }
            });
            let err = parse_dashboard_response(&body).unwrap_err();
            assert_eq!(err.to_string(), "api error: Invalid widget");
        }
    }
}
