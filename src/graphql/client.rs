//! GraphQL client
//!
//! Every call is a single POST to a fixed endpoint. A non-empty `errors`
//! array wins over the HTTP status so that upstream codes such as
//! `ENHANCE_YOUR_CALM` reach the caller verbatim.

use super::types::{GraphQlRequest, GraphQlResponse};
use crate::error::{Error, Result};
use crate::http::{status_body, HttpClient};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

/// Query used to confirm the credentials are accepted
const PING_QUERY: &str = "query { __typename }";

/// Result of an authentication ping
#[derive(Debug, Clone, Serialize)]
pub struct AuthPing {
    /// Whether the upstream accepted the request
    pub ok: bool,
    /// HTTP status returned
    pub status: u16,
    /// Parsed body, or `{}` when the body was not JSON
    pub body: Value,
}

/// Client for a single GraphQL endpoint
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    http: HttpClient,
    endpoint: String,
}

impl GraphQlClient {
    /// Create a client for `endpoint` using an already configured transport
    pub fn new(endpoint: impl Into<String>, http: HttpClient) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// The endpoint this client posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute a request and return its `data` member
    pub async fn execute(&self, request: &GraphQlRequest) -> Result<Value> {
        let body = serde_json::to_value(request)?;
        let response = self.http.post(&self.endpoint, &body).await?;
        let status = response.status();
        let text = response.text().await?;

        let parsed = serde_json::from_str::<GraphQlResponse>(&text);

        if let Some(errors) = parsed.as_ref().ok().and_then(GraphQlResponse::errors) {
            let message = serde_json::to_string_pretty(errors)?;
            debug!("GraphQL errors (HTTP {}): {}", status.as_u16(), message);
            return Err(Error::graphql(message));
        }

        if !status.is_success() {
            return Err(Error::http_status(status.as_u16(), status_body(status, text)));
        }

        parsed?
            .data
            .ok_or_else(|| Error::graphql("response carried neither data nor errors"))
    }

    /// Execute a request and deserialize the value found under `data.<field>`
    pub async fn query_field<T: DeserializeOwned>(
        &self,
        request: &GraphQlRequest,
        field: &str,
    ) -> Result<T> {
        let mut data = self.execute(request).await?;
        let value = data
            .get_mut(field)
            .map(Value::take)
            .filter(|v| !v.is_null())
            .ok_or_else(|| Error::graphql(format!("response data has no '{field}' field")))?;
        Ok(serde_json::from_value(value)?)
    }

    /// Minimal auth sanity check
    pub async fn ping(&self) -> Result<AuthPing> {
        let body = json!({ "query": PING_QUERY });
        let response = self.http.post(&self.endpoint, &body).await?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or_else(|_| json!({}));
        let has_errors = body.get("errors").is_some_and(|e| !e.is_null());

        Ok(AuthPing {
            ok: status.is_success() && !has_errors,
            status: status.as_u16(),
            body,
        })
    }
}
