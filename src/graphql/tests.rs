//! Tests for the GraphQL module

use super::*;
use crate::error::Error;
use crate::http::{HttpClient, HttpClientConfig};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GraphQlClient {
    let http = HttpClient::with_config(
        HttpClientConfig::builder()
            .header("x-api-key", "test-key")
            .build(),
    )
    .unwrap();
    GraphQlClient::new(server.uri(), http)
}

// ============================================================================
// Envelope Tests
// ============================================================================

#[test]
fn test_request_serialization() {
    let req = GraphQlRequest::new("query { a }");
    assert_eq!(serde_json::to_value(&req).unwrap(), json!({"query": "query { a }"}));

    let req = req.with_variables(json!({"first": 50, "after": null}));
    assert_eq!(
        serde_json::to_value(&req).unwrap(),
        json!({"query": "query { a }", "variables": {"first": 50, "after": null}})
    );
}

#[test]
fn test_response_empty_errors_are_ignored() {
    let resp: GraphQlResponse =
        serde_json::from_value(json!({"data": {"x": 1}, "errors": []})).unwrap();
    assert!(resp.errors().is_none());
}

#[test]
fn test_connection_deserialization() {
    let conn: Connection<Value> = serde_json::from_value(json!({
        "totalCount": 2,
        "pageInfo": {"hasNextPage": true, "endCursor": "c2"},
        "edges": [
            {"cursor": "c1", "node": {"id": "1"}},
            {"cursor": "c2", "node": {"id": "2"}}
        ]
    }))
    .unwrap();

    assert_eq!(conn.total_count, Some(2));
    assert!(conn.page_info.has_next_page);
    assert_eq!(conn.page_info.end_cursor.as_deref(), Some("c2"));
    assert_eq!(conn.into_nodes(), vec![json!({"id": "1"}), json!({"id": "2"})]);
}

#[test]
fn test_connection_defaults_when_fields_missing() {
    let conn: Connection<Value> = serde_json::from_value(json!({})).unwrap();
    assert!(conn.total_count.is_none());
    assert!(!conn.page_info.has_next_page);
    assert!(conn.edges.is_empty());
}

// ============================================================================
// Client Tests
// ============================================================================

#[tokio::test]
async fn test_execute_returns_data() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("x-api-key", "test-key"))
        .and(body_partial_json(json!({"variables": {"first": 3}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"allSeries": {"totalCount": 7}}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let req = GraphQlRequest::new("query Q($first: Int!) { allSeries(first: $first) { totalCount } }")
        .with_variables(json!({"first": 3}));
    let data = client.execute(&req).await.unwrap();

    assert_eq!(data["allSeries"]["totalCount"], 7);
}

#[tokio::test]
async fn test_execute_surfaces_errors_array_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{"message": "Too many requests", "extensions": {"errorType": "ENHANCE_YOUR_CALM"}}]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .execute(&GraphQlRequest::new("query { x }"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::GraphQl { .. }));
    assert!(err.to_string().contains("ENHANCE_YOUR_CALM"));
}

#[tokio::test]
async fn test_execute_errors_array_wins_over_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [{"message": "Unknown argument 'bogus'"}]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .execute(&GraphQlRequest::new("query { x }"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::GraphQl { .. }));
    assert!(err.to_string().contains("Unknown argument"));
}

#[tokio::test]
async fn test_execute_non_json_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .execute(&GraphQlRequest::new("query { x }"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "HTTP 502: bad gateway");
}

#[tokio::test]
async fn test_execute_missing_data() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .execute(&GraphQlRequest::new("query { x }"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::GraphQl { .. }));
}

#[tokio::test]
async fn test_query_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"tournaments": {
                "pageInfo": {"hasNextPage": false, "endCursor": null},
                "edges": [{"node": {"id": "1", "name": "Cup 2024"}}]
            }}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let conn: Connection<Value> = client
        .query_field(&GraphQlRequest::new("query { tournaments { edges { node { id } } } }"), "tournaments")
        .await
        .unwrap();
    assert_eq!(conn.edges.len(), 1);

    let err = client
        .query_field::<Connection<Value>>(&GraphQlRequest::new("query { x }"), "allSeries")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("allSeries"));
}

#[tokio::test]
async fn test_ping() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"query": "query { __typename }"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"__typename": "Query"}
        })))
        .mount(&server)
        .await;

    let ping = client_for(&server).ping().await.unwrap();
    assert!(ping.ok);
    assert_eq!(ping.status, 200);
}

#[tokio::test]
async fn test_ping_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let ping = client_for(&server).ping().await.unwrap();
    assert!(!ping.ok);
    assert_eq!(ping.status, 401);
    assert_eq!(ping.body, json!({}));
}
