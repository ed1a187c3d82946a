//! Artifact provisioning integration tests
//!
//! Runs a loopback registry server so fetch behavior (count, status
//! handling, atomic persist) can be observed end to end.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Router};

use moodsense::config::ModelConfig;
use moodsense::model::{provider, ArtifactError};

#[derive(Clone)]
struct Registry {
    hits: Arc<AtomicUsize>,
    status: StatusCode,
    body: Vec<u8>,
}

async fn serve_artifact(State(registry): State<Registry>) -> (StatusCode, Vec<u8>) {
    registry.hits.fetch_add(1, Ordering::SeqCst);
    (registry.status, registry.body.clone())
}

/// Spawn a loopback registry answering the artifact URL template.
async fn spawn_registry(status: StatusCode, body: Vec<u8>) -> (SocketAddr, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let registry = Registry {
        hits: hits.clone(),
        status,
        body,
    };

    let app = Router::new()
        .route("/:namespace/:repository/resolve/main/:filename", get(serve_artifact))
        .with_state(registry);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, hits)
}

fn registry_config(addr: SocketAddr, cache_dir: &std::path::Path) -> ModelConfig {
    ModelConfig {
        cache_dir: cache_dir.to_path_buf(),
        endpoint: format!("http://{addr}"),
        namespace: "moodsense".to_string(),
        repository: "mood-classifier".to_string(),
        filename: "mood-classifier-1.onnx".to_string(),
    }
}

#[tokio::test]
async fn first_run_fetches_once_then_hits_cache() {
    let (addr, hits) = spawn_registry(StatusCode::OK, b"onnx-model-bytes".to_vec()).await;
    let dir = tempfile::tempdir().unwrap();
    let config = registry_config(addr, dir.path());

    // Cache miss: exactly one fetch, bytes persisted at the cache path
    let path = provider::ensure_artifact(&config).await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(std::fs::read(&path).unwrap(), b"onnx-model-bytes");

    // No temp file left behind
    assert!(!path.with_extension("tmp").exists());

    // Cache hit: no further fetch
    let again = provider::ensure_artifact(&config).await.unwrap();
    assert_eq!(again, path);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn non_success_status_is_fatal_and_leaves_no_cache() {
    let (addr, hits) = spawn_registry(StatusCode::NOT_FOUND, Vec::new()).await;
    let dir = tempfile::tempdir().unwrap();
    let config = registry_config(addr, dir.path());

    let err = provider::ensure_artifact(&config).await.unwrap_err();
    match err {
        ArtifactError::FetchStatus { status } => assert_eq!(status, 404),
        other => panic!("Expected FetchStatus, got {other:?}"),
    }

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(!provider::artifact_path(&config).exists());
}

#[tokio::test]
async fn fetch_url_follows_registry_template() {
    let dir = tempfile::tempdir().unwrap();
    let config = ModelConfig {
        cache_dir: dir.path().to_path_buf(),
        endpoint: "https://huggingface.co".to_string(),
        namespace: "acme".to_string(),
        repository: "voices".to_string(),
        filename: "model.onnx".to_string(),
    };

    assert_eq!(
        config.artifact_url(),
        "https://huggingface.co/acme/voices/resolve/main/model.onnx"
    );
}
