//! Integration tests for HttpCatalogClient
//!
//! Runs the client against a small in-process catalog service.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use libbankcode::catalog::http::HttpCatalogClient;
use libbankcode::config::{CatalogConfig, Config};
use libbankcode::{CatalogClient, CatalogError, Location, LookupSession, Phase};

fn taipei_hq() -> Value {
    json!({
        "bank_code": "004",
        "branch_code": "0040001",
        "bank_name": "Taipei HQ",
        "phone": "02-1234",
        "address": "No.1 Rd"
    })
}

async fn banks() -> Json<Value> {
    Json(json!([
        { "bank_code": "004", "bank_name": "Bank 004 - Taipei" },
        { "bank_code": "004", "bank_name": "Bank 004 - Taipei" },
        { "bank_code": "007", "bank_name": "Bank 007 - Kaohsiung" }
    ]))
}

async fn branches(Path(bank): Path<String>) -> Response {
    match bank.as_str() {
        "004" => Json(json!([taipei_hq()])).into_response(),
        "500" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => Json(Value::Null).into_response(),
    }
}

async fn branch_detail(Path((bank, branch)): Path<(String, String)>) -> Response {
    match (bank.as_str(), branch.as_str()) {
        ("004", "0040001") => Json(taipei_hq()).into_response(),
        ("004", "0040002") => Json(json!([{
            "bank_code": "004",
            "branch_code": "0040002",
            "bank_name": "Taipei East"
        }]))
        .into_response(),
        ("004", "0048888") => Json(Value::Null).into_response(),
        ("004", "0047777") => Json(json!([])).into_response(),
        ("500", _) => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Start the stub catalog and return its base URL
async fn spawn_catalog() -> String {
    let app = Router::new()
        .route("/api/banks", get(banks))
        .route("/api/banks/:bank/branches", get(branches))
        .route("/api/banks/:bank/branches/:branch", get(branch_detail));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base_url: &str) -> HttpCatalogClient {
    HttpCatalogClient::new(&CatalogConfig {
        base_url: base_url.to_string(),
        timeout_secs: Some(5),
    })
    .unwrap()
}

#[tokio::test]
async fn test_list_banks_keeps_duplicates() {
    let base = spawn_catalog().await;
    let banks = client(&base).list_banks().await.unwrap();

    assert_eq!(banks.len(), 3);
    assert_eq!(libbankcode::types::distinct_bank_codes(&banks), vec!["004", "007"]);
}

#[tokio::test]
async fn test_list_branches() {
    let base = spawn_catalog().await;
    let client = client(&base);

    let branches = client.list_branches("004").await.unwrap();
    assert_eq!(branches.len(), 1);
    assert_eq!(branches[0].phone, "02-1234");

    // null payload is an empty list
    assert!(client.list_branches("007").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let base = spawn_catalog().await;
    let client = client(&base);

    assert!(matches!(
        client.list_branches("500").await,
        Err(CatalogError::Unavailable(_))
    ));
    assert!(matches!(
        client.get_branch("500", "5000001").await,
        Err(CatalogError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_get_branch_shapes() {
    let base = spawn_catalog().await;
    let client = client(&base);

    let branch = client.get_branch("004", "0040001").await.unwrap();
    assert_eq!(branch.address, "No.1 Rd");

    // One-element list, missing optional fields
    let branch = client.get_branch("004", "0040002").await.unwrap();
    assert_eq!(branch.bank_name, "Taipei East");
    assert!(branch.phone.is_empty());
}

#[tokio::test]
async fn test_get_branch_not_found_forms() {
    let base = spawn_catalog().await;
    let client = client(&base);

    for code in ["0049999", "0048888", "0047777"] {
        let err = client.get_branch("004", code).await.unwrap_err();
        assert_eq!(err, CatalogError::NotFound(format!("004/{}", code)));
    }
}

#[tokio::test]
async fn test_unreachable_catalog_is_unavailable() {
    let client = client("http://127.0.0.1:1");
    assert!(matches!(
        client.list_banks().await,
        Err(CatalogError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_session_over_http() {
    let base = spawn_catalog().await;
    let mut config = Config::default_config();
    config.catalog.base_url = base;

    let mut session = LookupSession::from_config(&config).unwrap();
    session.start(Location::parse("/banks/004/0040001"));
    session.settle().await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, Phase::BranchDetailReady);
    assert_eq!(snapshot.bank_codes, vec!["004", "007"]);
    assert_eq!(
        snapshot.selection.selected_branch_info.unwrap().phone,
        "02-1234"
    );
}
