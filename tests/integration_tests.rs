//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: CLI arguments → GraphQL pages → snapshot file

use clap::Parser;
use grid_harvest::cli::{Cli, Commands, Runner};
use grid_harvest::config::{HarvestArgs, UpstreamArgs};
use grid_harvest::output::load_snapshot;
use grid_harvest::Error;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::path::Path;
use tempfile::tempdir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "integration-key";

fn page(ids: &[&str], next: Option<&str>) -> Value {
    let edges: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "cursor": format!("edge-{id}"),
                "node": {"id": id, "name": format!("Cup {id} 2023"), "nameShortened": format!("C{id}")}
            })
        })
        .collect();

    json!({
        "data": {
            "tournaments": {
                "totalCount": 5,
                "pageInfo": {"hasNextPage": next.is_some(), "endCursor": next},
                "edges": edges
            }
        }
    })
}

fn after(cursor: Option<&str>) -> Value {
    json!({"variables": {"after": cursor}})
}

async fn mount_page(server: &MockServer, cursor: Option<&str>, body: Value) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("x-api-key", API_KEY))
        .and(body_partial_json(after(cursor)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Arguments are built directly so nothing leaks in from `GRID_*` variables
fn harvest_cli(server: &MockServer, output: &Path, harvest: HarvestArgs) -> Cli {
    Cli {
        verbose: false,
        command: Commands::Harvest {
            upstream: UpstreamArgs {
                endpoint: Some(format!("{}/graphql", server.uri())),
                auth_header_value: Some(API_KEY.to_string()),
                ..UpstreamArgs::default()
            },
            harvest,
            output: output.to_path_buf(),
        },
    }
}

fn no_delays() -> HarvestArgs {
    HarvestArgs {
        delay_ms: 0,
        rate_limit_delay_ms: 0,
        ..HarvestArgs::default()
    }
}

// ============================================================================
// Harvest Tests
// ============================================================================

#[tokio::test]
async fn test_harvest_writes_complete_snapshot_after_rate_limit() {
    let server = MockServer::start().await;

    mount_page(&server, None, page(&["1", "2"], Some("c2"))).await;
    mount_page(&server, Some("c2"), page(&["3", "4"], Some("c4"))).await;
    mount_page(&server, Some("c4"), page(&["5"], None)).await;

    // The first request for the second page is throttled
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(after(Some("c2"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{"message": "Too many requests", "extensions": {"code": "ENHANCE_YOUR_CALM"}}]
        })))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let output = dir.path().join("tournaments.json");

    Runner::new(harvest_cli(&server, &output, no_delays()))
        .run()
        .await
        .unwrap();

    let snapshot = load_snapshot(&output).await.unwrap();
    assert_eq!(snapshot.count, 5);
    let ids: Vec<&str> = snapshot
        .items
        .iter()
        .map(|item| item["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);

    let raw: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert!(raw["exportedAt"].as_str().unwrap().ends_with('Z'));
    assert_eq!(raw["items"][0]["nameShortened"], "C1");
}

#[tokio::test]
async fn test_harvest_fatal_error_writes_nothing() {
    let server = MockServer::start().await;

    mount_page(&server, None, page(&["1", "2"], Some("c2"))).await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(after(Some("c2"))))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let output = dir.path().join("tournaments.json");

    let err = Runner::new(harvest_cli(&server, &output, no_delays()))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 401, .. }));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_harvest_retry_ceiling() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(503).set_body_string("rate limit exceeded"))
        .expect(3)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let output = dir.path().join("tournaments.json");

    let harvest = HarvestArgs {
        max_rate_limit_retries: Some(2),
        ..no_delays()
    };
    let err = Runner::new(harvest_cli(&server, &output, harvest))
        .run()
        .await
        .unwrap_err();

    match err {
        Error::RetriesExhausted {
            cursor, attempts, ..
        } => {
            assert_eq!(cursor, "null");
            assert_eq!(attempts, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());
}

#[tokio::test]
async fn test_harvest_missing_end_cursor_is_fatal() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        None,
        json!({
            "data": {
                "tournaments": {
                    "pageInfo": {"hasNextPage": true, "endCursor": null},
                    "edges": [{"node": {"id": "1", "name": "Cup"}}]
                }
            }
        }),
    )
    .await;

    let dir = tempdir().unwrap();
    let output = dir.path().join("tournaments.json");

    let err = Runner::new(harvest_cli(&server, &output, no_delays()))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Pagination { .. }));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_harvest_requires_credentials() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("tournaments.json");
    let cli = Cli {
        verbose: false,
        command: Commands::Harvest {
            upstream: UpstreamArgs {
                endpoint: Some("https://example.invalid/graphql".to_string()),
                ..UpstreamArgs::default()
            },
            harvest: no_delays(),
            output: output.clone(),
        },
    };

    let err = Runner::new(cli).run().await.unwrap_err();
    assert!(matches!(
        err,
        Error::MissingConfigField { ref field } if field == "GRID_AUTH_HEADER_VALUE"
    ));
    assert!(!output.exists());
}

// ============================================================================
// Snapshot Tool Tests
// ============================================================================

fn write_fixture(dir: &Path) -> std::path::PathBuf {
    let input = dir.join("tournaments.json");
    std::fs::write(
        &input,
        serde_json::to_string_pretty(&json!({
            "exportedAt": "2024-01-01T00:00:00.000Z",
            "count": 3,
            "items": [
                {"id": "1", "name": "LCK \"Spring\" 2023", "nameShortened": "LCK"},
                {"id": "2", "name": "VCT Masters 2024", "nameShortened": null},
                {"id": "3", "name": "Worlds 2023"}
            ]
        }))
        .unwrap(),
    )
    .unwrap();
    input
}

#[tokio::test]
async fn test_export_csv_from_snapshot() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path());
    let out = dir.path().join("tournaments_2023.csv");

    let cli = Cli::try_parse_from([
        "grid-harvest",
        "export-csv",
        "--year",
        "2023",
        "--input",
        input.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
    ])
    .unwrap();
    Runner::new(cli).run().await.unwrap();

    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "id,name,nameShortened\n1,\"LCK \"\"Spring\"\" 2023\",\"LCK\"\n3,\"Worlds 2023\",\"\""
    );
}

#[tokio::test]
async fn test_list_rejects_bad_year() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path());

    let cli = Cli::try_parse_from([
        "grid-harvest",
        "list",
        "--year",
        "23",
        "--input",
        input.to_str().unwrap(),
    ])
    .unwrap();

    let err = Runner::new(cli).run().await.unwrap_err();
    assert!(matches!(err, Error::InvalidConfigValue { .. }));
}

#[tokio::test]
async fn test_list_by_year() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path());

    let cli = Cli::try_parse_from([
        "grid-harvest",
        "list",
        "--year",
        "2023",
        "--input",
        input.to_str().unwrap(),
    ])
    .unwrap();

    Runner::new(cli).run().await.unwrap();
}

#[tokio::test]
async fn test_list_by_name() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path());

    let cli = Cli::try_parse_from([
        "grid-harvest",
        "list",
        "--name",
        "vct",
        "--input",
        input.to_str().unwrap(),
    ])
    .unwrap();

    Runner::new(cli).run().await.unwrap();
}

#[tokio::test]
async fn test_list_missing_snapshot() {
    let dir = tempdir().unwrap();
    let cli = Cli::try_parse_from([
        "grid-harvest",
        "list",
        "--name",
        "vct",
        "--input",
        dir.path().join("absent.json").to_str().unwrap(),
    ])
    .unwrap();

    let err = Runner::new(cli).run().await.unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));
}
