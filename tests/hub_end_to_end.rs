//! End-to-end analysis through the reqwest adapter against a local mock Hub.
//!
//! Every test starts its own `MockServer`, points the client at it with
//! `with_endpoint`, and runs the full walk, fetch and extraction pipeline.

use std::time::Duration;

use hubprobe::{
    AnalysisError, AnalysisRequest, AnalyzerOptions, CancellationToken, HfClientConfig,
    RepoDetails, RepoSnapshot, RepoType, analyzer_from_config, recommended_command,
};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GIB: u64 = 1024 * 1024 * 1024;

// =============================================================================
// Helpers
// =============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn config_for(server: &MockServer) -> HfClientConfig {
    HfClientConfig::new()
        .with_endpoint(server.uri())
        .with_retry_delay(Duration::from_millis(1))
}

async fn mount_json(server: &MockServer, url_path: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, url_path: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

async fn analyze(
    config: &HfClientConfig,
    request: AnalysisRequest,
) -> Result<RepoSnapshot, AnalysisError> {
    let analyzer = analyzer_from_config(config, AnalyzerOptions::default()).unwrap();
    analyzer.analyze(&request, &CancellationToken::new()).await
}

async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect()
}

// =============================================================================
// Successful analyses
// =============================================================================

#[tokio::test]
async fn gguf_repository_with_sharded_subdirectory() {
    init_tracing();
    let server = MockServer::start().await;

    mount_json(
        &server,
        "/api/models/o/llama-GGUF/tree/main",
        json!([
            {"type": "file", "path": "README.md", "size": 100},
            {"type": "file", "path": "llama-2-7b.Q4_K_M.gguf", "size": 135,
             "lfs": {"oid": "a1", "size": 4 * GIB, "pointerSize": 135}},
            {"type": "directory", "path": "Q8_0", "size": 0}
        ]),
    )
    .await;
    mount_json(
        &server,
        "/api/models/o/llama-GGUF/tree/main/Q8_0",
        json!([
            {"type": "file", "path": "Q8_0/llama-2-7b-Q8_0-00001-of-00002.gguf", "size": 135,
             "lfs": {"oid": "b1", "size": 4 * GIB}},
            {"type": "file", "path": "Q8_0/llama-2-7b-Q8_0-00002-of-00002.gguf", "size": 135,
             "lfs": {"oid": "b2", "size": 3 * GIB}}
        ]),
    )
    .await;
    mount_json(
        &server,
        "/api/models/o/llama-GGUF/refs",
        json!({
            "branches": [{"name": "main", "ref": "refs/heads/main", "targetCommit": "abc123"}],
            "tags": [{"name": "v1", "ref": "refs/tags/v1", "targetCommit": "def456"}]
        }),
    )
    .await;

    let snap = analyze(&config_for(&server), AnalysisRequest::model("o/llama-GGUF"))
        .await
        .unwrap();

    assert_eq!(snap.repo_type(), RepoType::Gguf);
    assert_eq!(snap.file_count(), 4);
    assert_eq!(snap.total_size(), 100 + 11 * GIB);
    assert_eq!(snap.commit.as_deref(), Some("abc123"));
    assert_eq!(snap.refs.len(), 2);

    let RepoDetails::Gguf(info) = &snap.details else {
        panic!("expected gguf details, got {:?}", snap.repo_type());
    };
    let q8 = info.quantizations.iter().find(|q| q.id == "q8_0").unwrap();
    assert_eq!(q8.files.len(), 2);
    assert_eq!(q8.size, 7 * GIB);
    assert!(info.quantizations.iter().any(|q| q.id == "q4_k_m"));

    assert_eq!(recommended_command(&snap), "download o/llama-GGUF -F q4_k_m");
    assert_eq!(
        requested_paths(&server).await,
        vec![
            "/api/models/o/llama-GGUF/tree/main",
            "/api/models/o/llama-GGUF/tree/main/Q8_0",
            "/api/models/o/llama-GGUF/refs",
        ]
    );
}

#[tokio::test]
async fn diffusers_repository_reads_model_index() {
    init_tracing();
    let server = MockServer::start().await;

    mount_json(
        &server,
        "/api/models/o/sd/tree/main",
        json!([
            {"type": "file", "path": "model_index.json", "size": 300},
            {"type": "directory", "path": "unet", "size": 0}
        ]),
    )
    .await;
    mount_json(
        &server,
        "/api/models/o/sd/tree/main/unet",
        json!([
            {"type": "file", "path": "unet/config.json", "size": 900},
            {"type": "file", "path": "unet/diffusion_pytorch_model.fp16.safetensors", "size": 135,
             "lfs": {"oid": "c1", "size": GIB}},
            {"type": "file", "path": "unet/diffusion_pytorch_model.safetensors", "size": 135,
             "lfs": {"oid": "c2", "size": 2 * GIB}}
        ]),
    )
    .await;
    mount_json(
        &server,
        "/o/sd/raw/main/model_index.json",
        json!({
            "_class_name": "StableDiffusionPipeline",
            "_diffusers_version": "0.21.0",
            "unet": ["diffusers", "UNet2DConditionModel"]
        }),
    )
    .await;

    let snap = analyze(&config_for(&server), AnalysisRequest::model("o/sd"))
        .await
        .unwrap();

    assert_eq!(snap.repo_type(), RepoType::Diffusers);
    assert!(snap.metadata.contains_key("model_index.json"));
    let RepoDetails::Diffusers(info) = &snap.details else {
        panic!("expected diffusers details");
    };
    assert_eq!(info.pipeline_type.as_deref(), Some("StableDiffusionPipeline"));
    assert_eq!(info.diffusers_version.as_deref(), Some("0.21.0"));
    assert_eq!(info.variants, vec!["fp16".to_string()]);
    // Refs endpoint is absent here; the listing is best-effort.
    assert!(snap.refs.is_empty());
    assert_eq!(snap.commit, None);
}

#[tokio::test]
async fn dataset_repository_uses_dataset_endpoints() {
    init_tracing();
    let server = MockServer::start().await;

    mount_json(
        &server,
        "/api/datasets/org/data/tree/v2",
        json!([
            {"type": "file", "path": "README.md", "size": 50},
            {"type": "directory", "path": "data", "size": 0}
        ]),
    )
    .await;
    mount_json(
        &server,
        "/api/datasets/org/data/tree/v2/data",
        json!([
            {"type": "file", "path": "data/train-00000.parquet", "size": 135,
             "lfs": {"oid": "d1", "size": 3000}},
            {"type": "file", "path": "data/test-00000.parquet", "size": 135,
             "lfs": {"oid": "d2", "size": 500}}
        ]),
    )
    .await;
    mount_json(
        &server,
        "/api/datasets/org/data/refs",
        json!({"branches": [{"name": "v2", "targetCommit": "fff"}], "tags": []}),
    )
    .await;

    let request = AnalysisRequest::dataset("org/data").with_revision("v2");
    let snap = analyze(&config_for(&server), request).await.unwrap();

    assert_eq!(snap.repo_type(), RepoType::Dataset);
    assert_eq!(snap.revision, "v2");
    assert_eq!(snap.commit.as_deref(), Some("fff"));
    let RepoDetails::Dataset(info) = &snap.details else {
        panic!("expected dataset details");
    };
    assert_eq!(info.split("train").unwrap().size, 3000);
    assert_eq!(
        recommended_command(&snap),
        "download org/data --dataset -b v2 -F train"
    );
}

#[tokio::test]
async fn bearer_token_is_sent() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/models/o/private/tree/main"))
        .and(header("authorization", "Bearer hf_secret"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"type": "file", "path": "notes.txt", "size": 3}])),
        )
        .mount(&server)
        .await;

    let config = config_for(&server).with_token("hf_secret");
    let snap = analyze(&config, AnalysisRequest::model("o/private"))
        .await
        .unwrap();
    assert_eq!(snap.repo_type(), RepoType::Generic);
}

#[tokio::test]
async fn transient_server_error_is_retried() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/models/o/flaky/tree/main"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_json(
        &server,
        "/api/models/o/flaky/tree/main",
        json!([{"type": "file", "path": "m.Q4_0.gguf", "size": 10}]),
    )
    .await;

    let snap = analyze(&config_for(&server), AnalysisRequest::model("o/flaky"))
        .await
        .unwrap();
    assert_eq!(snap.repo_type(), RepoType::Gguf);

    let tree_requests = requested_paths(&server)
        .await
        .into_iter()
        .filter(|p| p.ends_with("/tree/main"))
        .count();
    assert_eq!(tree_requests, 2);
}

#[tokio::test]
async fn oversized_metadata_is_skipped() {
    init_tracing();
    let server = MockServer::start().await;

    mount_json(
        &server,
        "/api/models/o/tf/tree/main",
        json!([
            {"type": "file", "path": "config.json", "size": 20},
            {"type": "file", "path": "model.safetensors", "size": 135,
             "lfs": {"oid": "e1", "size": GIB}}
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/o/tf/raw/main/config.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(256)))
        .mount(&server)
        .await;

    let config = config_for(&server).with_max_raw_bytes(64);
    let snap = analyze(&config, AnalysisRequest::model("o/tf"))
        .await
        .unwrap();

    assert_eq!(snap.repo_type(), RepoType::Transformers);
    assert!(snap.metadata.is_empty());
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn gated_repository_points_at_terms_page() {
    init_tracing();
    let server = MockServer::start().await;
    mount_status(&server, "/api/models/org/gated/tree/main", 403).await;

    let err = analyze(&config_for(&server), AnalysisRequest::model("org/gated"))
        .await
        .unwrap_err();

    match &err {
        AnalysisError::Forbidden { repo, terms_url } => {
            assert_eq!(repo, "org/gated");
            assert_eq!(terms_url, &format!("{}/org/gated", server.uri()));
        }
        other => panic!("expected Forbidden, got {other:?}"),
    }
    assert!(err.to_string().contains("accept the repository terms at"));
}

#[tokio::test]
async fn missing_repository_is_not_found() {
    init_tracing();
    let server = MockServer::start().await;
    mount_status(&server, "/api/models/o/missing/tree/main", 404).await;

    let err = analyze(&config_for(&server), AnalysisRequest::model("o/missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::NotFound { ref repo, .. } if repo == "o/missing"));
}

#[tokio::test]
async fn unauthorized_repository() {
    init_tracing();
    let server = MockServer::start().await;
    mount_status(&server, "/api/models/o/private/tree/main", 401).await;

    let err = analyze(&config_for(&server), AnalysisRequest::model("o/private"))
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Unauthorized { .. }));
}

#[tokio::test]
async fn malformed_listing_is_a_decode_error() {
    init_tracing();
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/api/models/o/odd/tree/main",
        json!({"error": "unexpected"}),
    )
    .await;

    let err = analyze(&config_for(&server), AnalysisRequest::model("o/odd"))
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Decode { .. }));
}

#[tokio::test]
async fn cancelled_analysis_sends_no_requests() {
    init_tracing();
    let server = MockServer::start().await;

    let analyzer = analyzer_from_config(&config_for(&server), AnalyzerOptions::default()).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = analyzer
        .analyze(&AnalysisRequest::model("o/m"), &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert!(requested_paths(&server).await.is_empty());
}
