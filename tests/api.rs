use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use domain_discovery::config::Settings;
use domain_discovery::metrics::Metrics;
use domain_discovery::oracle::Oracle;
use domain_discovery::search::{Search, SearchEngine};
use domain_discovery::storage::{DomainStore, MemoryStore, Record};
use domain_discovery::web::{create_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app_with(records: Vec<Record>) -> Router {
    let metrics = Arc::new(Metrics::new());
    let store: Arc<dyn DomainStore> = Arc::new(MemoryStore::with_records(records));
    let search = Search::new(SearchEngine::builtin(), Oracle::disabled())
        .with_metrics(metrics.clone());
    create_router(AppState::new(Settings::default(), store, search, metrics))
}

fn seeded() -> Vec<Record> {
    vec![
        Record::new("photoedit.com", "AI photo editing tool").with_id("photo"),
        Record::new("bank.com", "online banking").with_id("bank"),
    ]
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_version() {
    let app = app_with(Vec::new());
    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], domain_discovery::VERSION);
}

#[tokio::test]
async fn add_list_and_remove_domain() {
    let app = app_with(Vec::new());

    let (status, created) = send(
        &app,
        post_json(
            "/api/domains",
            json!({ "domain": "https://www.PhotoEdit.com/", "description": "AI photo editing tool" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["domain"], "photoedit.com");
    assert!(created["favicon"]
        .as_str()
        .unwrap()
        .contains("photoedit.com"));
    assert!(created["createdAt"].is_i64());

    let (_, listed) = send(&app, get("/api/domains")).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let id = created["id"].as_str().unwrap();
    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/api/domains/{}", id))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listed) = send(&app, get("/api/domains")).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn rejected_submissions() {
    let app = app_with(seeded());

    let (status, body) = send(
        &app,
        post_json("/api/domains", json!({ "domain": "BANK.com", "description": "dup" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already exists"));

    let (status, _) = send(
        &app,
        post_json("/api/domains", json!({ "domain": "not a domain", "description": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        post_json("/api/domains", json!({ "domain": "example.org", "description": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn local_search_ranks_best_first() {
    let app = app_with(seeded());
    let (status, body) = send(&app, get("/api/search?q=picture%20editor")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "picture editor");
    assert_eq!(body["results"][0]["domain"], "photoedit.com");
}

#[tokio::test]
async fn empty_search_lists_everything() {
    let app = app_with(seeded());
    let (_, body) = send(&app, get("/api/search")).await;
    assert_eq!(body["number_of_results"], 2);
    assert_eq!(body["results"][0]["id"], "photo");
    assert_eq!(body["results"][1]["id"], "bank");
}

#[tokio::test]
async fn smart_search_without_oracle_matches_local() {
    let app = app_with(seeded());
    let (_, local) = send(&app, get("/api/search?q=banking")).await;
    let (status, smart) = send(&app, get("/api/search/smart?q=banking")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(smart["enrichment_used"], false);
    let local_ids: Vec<&Value> = local["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| &r["id"])
        .collect();
    let smart_ids: Vec<&Value> = smart["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| &r["id"])
        .collect();
    assert_eq!(smart_ids, local_ids);
}

#[tokio::test]
async fn autocomplete_needs_two_characters() {
    let app = app_with(seeded());

    let (_, short) = send(&app, get("/autocomplete?q=b")).await;
    assert!(short.as_array().unwrap().is_empty());

    let (_, limited) = send(&app, get("/autocomplete?q=banking&limit=1")).await;
    assert_eq!(limited.as_array().unwrap().len(), 1);
    assert_eq!(limited[0]["domain"], "bank.com");
}

#[tokio::test]
async fn stats_count_searches() {
    let app = app_with(seeded());
    send(&app, get("/api/search?q=photo")).await;
    send(&app, get("/autocomplete?q=photo")).await;

    let (status, stats) = send(&app, get("/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["domain_count"], 2);
    assert_eq!(stats["oracle_backend"], "none");
    assert!(stats["oracle_cache_entries"].is_null());
    assert_eq!(stats["metrics"]["local_searches"], 1);
    assert_eq!(stats["metrics"]["suggestions"], 1);
}
