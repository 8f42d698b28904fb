//! HTTP proxy for upcoming matches
//!
//! Forwards a fixed upcoming-series query to the upstream with the configured
//! credentials and returns a flattened JSON list that a frontend can consume
//! without knowing the GraphQL schema.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::UpstreamSettings;
use crate::error::{Error, Result};
use crate::graphql::{Connection, GraphQlClient, GraphQlRequest};
use crate::types::OptionStringExt;

/// Series scheduled inside a time window, earliest first
pub const UPCOMING_QUERY: &str = r"
query UpcomingSeries($from: String!, $to: String!, $first: Int!) {
  allSeries(
    first: $first
    orderBy: StartTimeScheduled
    orderDirection: ASC
    filter: { startTimeScheduled: { gte: $from, lte: $to } }
  ) {
    totalCount
    edges {
      node {
        id
        startTimeScheduled
        updatedAt
        tournament { id name }
        format { id }
        teams { baseInfo { id name } }
      }
    }
  }
}
";

/// Window and sample size used by `/health`
const HEALTH_SAMPLE_HOURS: f64 = 6.0;
const HEALTH_SAMPLE_SIZE: u32 = 3;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    client: GraphQlClient,
}

impl ServerConfig {
    /// Build the upstream client from validated settings
    pub fn new(settings: UpstreamSettings) -> Result<Self> {
        Ok(Self {
            client: settings.graphql_client()?,
        })
    }

    /// Use an existing client
    pub fn from_client(client: GraphQlClient) -> Self {
        Self { client }
    }
}

/// App state shared across handlers
struct AppState {
    config: ServerConfig,
}

/// Query string of `/matches.json`, parsed by hand so bad values get the JSON error body
#[derive(Debug, Default, Deserialize)]
struct MatchesParams {
    hours: Option<String>,
    first: Option<String>,
}

impl MatchesParams {
    const DEFAULT_HOURS: f64 = 24.0;
    const DEFAULT_FIRST: u32 = 50;

    fn hours(&self) -> Result<f64> {
        match self.hours.clone().none_if_empty() {
            None => Ok(Self::DEFAULT_HOURS),
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|h| h.is_finite())
                .ok_or_else(|| Error::invalid_value("hours", format!("not a number: '{raw}'"))),
        }
    }

    fn first(&self) -> Result<u32> {
        match self.first.clone().none_if_empty() {
            None => Ok(Self::DEFAULT_FIRST),
            Some(raw) => raw.trim().parse::<u32>().map_err(|_| {
                Error::invalid_value("first", format!("not a non-negative integer: '{raw}'"))
            }),
        }
    }
}

/// One upcoming series, flattened for display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingMatch {
    pub id: Value,
    pub event_name: String,
    pub format: String,
    pub time: Value,
    pub updated_at: Value,
    pub t1_name: String,
    pub t2_name: String,
    pub live: bool,
    pub s1: String,
    pub s2: String,
    pub map: String,
}

impl UpcomingMatch {
    /// Flatten an `allSeries` node; absent fields become empty strings
    pub fn from_node(node: &Value) -> Self {
        let text = |pointer: &str| {
            node.pointer(pointer)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let format = match node.pointer("/format/id") {
            Some(Value::String(id)) if !id.is_empty() => format!("BO{id}"),
            Some(Value::Number(id)) => format!("BO{id}"),
            _ => String::new(),
        };

        Self {
            id: node.get("id").cloned().unwrap_or(Value::Null),
            event_name: text("/tournament/name"),
            format,
            time: node.get("startTimeScheduled").cloned().unwrap_or(Value::Null),
            updated_at: node.get("updatedAt").cloned().unwrap_or(Value::Null),
            t1_name: text("/teams/0/baseInfo/name"),
            t2_name: text("/teams/1/baseInfo/name"),
            live: false,
            s1: String::new(),
            s2: String::new(),
            map: String::new(),
        }
    }
}

/// Build the proxy router
pub fn router(config: ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/matches.json", get(matches))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(Arc::new(AppState { config }))
}

/// Start the HTTP server
pub async fn serve(config: ServerConfig, port: u16) -> Result<()> {
    let app = router(config);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("GRID proxy listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

async fn index() -> &'static str {
    "OK - use /health or /matches.json"
}

/// Auth ping followed by a tiny upcoming sample
async fn health(State(state): State<Arc<AppState>>) -> Response {
    let client = &state.config.client;

    let ping = match client.ping().await {
        Ok(ping) => ping,
        Err(e) => return error_response(&e),
    };
    if !ping.ok {
        tracing::warn!("Auth ping rejected with HTTP {}", ping.status);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "ok": false, "auth": ping })),
        )
            .into_response();
    }

    match fetch_upcoming(client, Utc::now(), HEALTH_SAMPLE_HOURS, HEALTH_SAMPLE_SIZE).await {
        Ok(series) => Json(json!({
            "ok": true,
            "auth": { "ok": true },
            "sampleCount": series.and_then(|s| s.total_count).unwrap_or(0),
        }))
        .into_response(),
        Err(e) => error_response(&e),
    }
}

/// Upcoming series in `[now, now + hours]`
async fn matches(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MatchesParams>,
) -> Response {
    let (hours, first) = match params.hours().and_then(|h| params.first().map(|f| (h, f))) {
        Ok(parsed) => parsed,
        Err(e) => return error_response(&e),
    };

    let series = match fetch_upcoming(&state.config.client, Utc::now(), hours, first).await {
        Ok(series) => series,
        Err(e) => return error_response(&e),
    };

    let out: Vec<UpcomingMatch> = series
        .map(|s| s.edges.iter().map(|e| UpcomingMatch::from_node(&e.node)).collect())
        .unwrap_or_default();

    ([(header::CACHE_CONTROL, "no-store")], Json(out)).into_response()
}

async fn fetch_upcoming(
    client: &GraphQlClient,
    now: DateTime<Utc>,
    hours: f64,
    first: u32,
) -> Result<Option<Connection<Value>>> {
    let (from, to) = window(now, hours)?;
    let request = GraphQlRequest::new(UPCOMING_QUERY)
        .with_variables(json!({ "from": from, "to": to, "first": first }));

    let mut data = client.execute(&request).await?;
    let series = data.get_mut("allSeries").map(Value::take).unwrap_or_default();
    Ok(serde_json::from_value(series)?)
}

/// Window bounds as ISO-8601 UTC without fractional seconds
fn window(now: DateTime<Utc>, hours: f64) -> Result<(String, String)> {
    let out_of_range = || Error::invalid_value("hours", format!("{hours} is out of range"));

    if !hours.is_finite() {
        return Err(out_of_range());
    }
    let to = TimeDelta::try_milliseconds((hours * 3_600_000.0) as i64)
        .and_then(|span| now.checked_add_signed(span))
        .ok_or_else(out_of_range)?;

    Ok((
        now.to_rfc3339_opts(SecondsFormat::Secs, true),
        to.to_rfc3339_opts(SecondsFormat::Secs, true),
    ))
}

fn error_response(err: &Error) -> Response {
    tracing::error!("Request failed: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "ok": false, "error": err.to_string() })),
    )
        .into_response()
}
