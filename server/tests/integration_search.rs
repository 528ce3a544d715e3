use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use docsearch_core::persist::{save_snapshot, IndexPaths};
use docsearch_core::{Document, IndexBuilder, SearchIndex};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tempfile::tempdir;
use tower::ServiceExt;

const SAMPLE_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../core/tests/data/searchindex.js");

fn build_tiny_index() -> SearchIndex {
    let mut b = IndexBuilder::new();
    b.add_document(Document {
        title: "Rust".into(),
        body: "Rust is great. rust systems programming.".into(),
        breadcrumbs: "Languages » Rust".into(),
        url: "rust.html#rust".into(),
    });
    b.add_document(Document {
        title: "Learning".into(),
        body: "Learning rust.".into(),
        breadcrumbs: "Languages » Learning".into(),
        url: "learning.html#learning".into(),
    });
    b.build()
}

async fn call(app: Router, uri: &str) -> (StatusCode, Bytes) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let app = docsearch_server::build_router(Arc::new(build_tiny_index()));

    let (status, body) = call(app, "/search?q=rust&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total_hits"].as_u64(), Some(2));
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["doc"].as_u64(), Some(0));
    assert_eq!(arr[1]["doc"].as_u64(), Some(1));
    assert_eq!(arr[0]["url"], "rust.html#rust");
    assert!(arr[0]["teaser"].as_str().unwrap().contains("<em>Rust</em>"));
}

#[tokio::test]
async fn limit_parameter_truncates() {
    let app = docsearch_server::build_router(Arc::new(build_tiny_index()));
    let (_, body) = call(app, "/search?q=rust&limit=1").await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total_hits"].as_u64(), Some(2));
    assert_eq!(json["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn and_mode_from_query_string() {
    let app = docsearch_server::build_router(Arc::new(build_tiny_index()));
    let (status, body) = call(app, "/search?q=rust+systems&bool=AND").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["title"], "Rust");
}

#[tokio::test]
async fn empty_query_is_not_an_error() {
    let app = docsearch_server::build_router(Arc::new(build_tiny_index()));
    let (status, body) = call(app, "/search").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total_hits"].as_u64(), Some(0));
}

#[tokio::test]
async fn doc_lookup_and_missing_doc() {
    let app = docsearch_server::build_router(Arc::new(build_tiny_index()));
    let (status, body) = call(app.clone(), "/doc/1").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["text"], "Learning rust.");
    assert_eq!(json["url"], "learning.html#learning");

    let (status, _) = call(app, "/doc/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn serves_the_generated_sample_index() {
    let app = docsearch_server::build_app(SAMPLE_PATH).unwrap();
    let (status, body) = call(app, "/search?q=design").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["results"][0]["title"], "Design");
}

#[tokio::test]
async fn loads_snapshot_directory() {
    let dir = tempdir().unwrap();
    save_snapshot(&IndexPaths::new(dir.path()), &build_tiny_index()).unwrap();
    let app = docsearch_server::build_app(&dir.path().to_string_lossy()).unwrap();
    let (status, body) = call(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"ok");
}

#[test]
fn malformed_index_fails_at_startup() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("searchindex.json");
    std::fs::write(&path, r#"{"doc_urls": []}"#).unwrap();
    let err = docsearch_server::build_app(&path.to_string_lossy()).unwrap_err();
    assert!(format!("{err:#}").contains("index"));
}
