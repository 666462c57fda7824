//! End-to-end tests against an in-process scoring service

use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use fraudshield_pipeline::{
    analysis::HistogramBins,
    config::ScoringConfig,
    session::SessionState,
    Pipeline, PipelineError, Prediction, ScoringClient, ScoringService, TableIngestor,
    UploadFile,
};
use serde_json::json;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

const SAMPLE_CSV: &str = "Time,V1,Amount\n0,-1.35,149.62\n1,1.19,2.69\n2,-3.2,9000\n";

async fn predict(body: Bytes) -> Response {
    let body = String::from_utf8_lossy(&body);
    if !body.contains("name=\"file\"") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Missing file upload"})),
        )
            .into_response();
    }
    if !body.contains("Time,V1,Amount") {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": "Unexpected columns"})),
        )
            .into_response();
    }

    Json(json!({
        "summary": {"total_transactions": 3, "predicted_frauds": 1, "fraud_percentage": 33.33333333333333},
        "predictions": [
            {"Time": 0, "V1": -1.35, "Amount": 149.62,
             "Fraud Probability (%)": 0.5, "Anomaly Score (%)": 4.0,
             "Hybrid Risk Score (%)": 2.25, "Prediction": 0},
            {"Time": 1, "V1": 1.19, "Amount": 2.69,
             "Fraud Probability (%)": 30.0, "Anomaly Score (%)": 60.0,
             "Hybrid Risk Score (%)": 45.0, "Prediction": 0},
            {"Time": 2, "V1": -3.2, "Amount": 9000.0,
             "Fraud Probability (%)": 97.5, "Anomaly Score (%)": 88.0,
             "Hybrid Risk Score (%)": 92.75, "Prediction": 1}
        ]
    }))
    .into_response()
}

async fn slow(body: Bytes) -> Response {
    tokio::time::sleep(Duration::from_secs(10)).await;
    predict(body).await
}

async fn delayed(body: Bytes) -> Response {
    tokio::time::sleep(Duration::from_millis(1500)).await;
    predict(body).await
}

async fn broken() -> &'static str {
    "<html>upstream error</html>"
}

async fn crash() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "API is running"}))
}

async fn spawn_service() -> SocketAddr {
    let app = Router::new()
        .route("/", get(health))
        .route("/predict", post(predict))
        .route("/slow", post(slow))
        .route("/delayed", post(delayed))
        .route("/broken", post(broken))
        .route("/crash", post(crash));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr, path: &str, field: &str) -> ScoringClient {
    client_with_timeout(addr, path, field, 5)
}

fn client_with_timeout(addr: SocketAddr, path: &str, field: &str, timeout_secs: u64) -> ScoringClient {
    ScoringClient::new(&ScoringConfig {
        endpoint: format!("http://{}{}", addr, path),
        health_endpoint: format!("http://{}/", addr),
        timeout_secs,
        file_field: field.to_string(),
    })
    .unwrap()
}

fn upload() -> UploadFile {
    UploadFile::new("transactions.csv", SAMPLE_CSV.as_bytes().to_vec())
}

#[tokio::test]
async fn analyze_returns_predictions() {
    let addr = spawn_service().await;
    let client = client_for(addr, "/predict", "file");

    let response = client.analyze(&upload()).await.unwrap();

    assert_eq!(response.predictions.len(), 3);
    assert_eq!(response.predictions[2].prediction, Some(1.0));
    assert_eq!(response.predictions[0].amount, Some(149.62));
    assert_eq!(response.summary.map(|s| s.predicted_frauds), Some(1));
}

#[tokio::test]
async fn rejected_upload_carries_service_detail() {
    let addr = spawn_service().await;
    let client = client_for(addr, "/predict", "document");

    let err = client.analyze(&upload()).await.unwrap_err();

    match &err {
        PipelineError::AnalysisFailed(message) => {
            assert!(message.contains("400"));
            assert!(message.contains("Missing file upload"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.user_message(), PipelineError::AnalysisFailed(String::new()).user_message());
}

#[tokio::test]
async fn plain_text_error_body_is_kept() {
    let addr = spawn_service().await;
    let client = client_for(addr, "/crash", "file");

    let err = client.analyze(&upload()).await.unwrap_err();

    assert_eq!(
        err,
        PipelineError::AnalysisFailed("service returned 500: Internal Server Error".to_string())
    );
}

#[tokio::test]
async fn malformed_response_is_analysis_failure() {
    let addr = spawn_service().await;
    let client = client_for(addr, "/broken", "file");

    let err = client.analyze(&upload()).await.unwrap_err();

    assert!(matches!(err, PipelineError::AnalysisFailed(ref m) if m.contains("malformed")));
}

#[tokio::test]
async fn hung_service_times_out() {
    let addr = spawn_service().await;
    let client = client_with_timeout(addr, "/slow", "file", 1);

    let start = Instant::now();
    let err = client.analyze(&upload()).await.unwrap_err();
    let elapsed = start.elapsed();

    assert!(matches!(err, PipelineError::AnalysisFailed(ref m) if m.contains("timed out")));
    assert!(elapsed >= Duration::from_millis(900));
    assert!(elapsed < Duration::from_secs(5));
}

#[tokio::test]
async fn zero_timeout_waits_for_slow_service() {
    let addr = spawn_service().await;
    let client = client_with_timeout(addr, "/delayed", "file", 0);

    let response = client.analyze(&upload()).await.unwrap();

    assert_eq!(response.predictions.len(), 3);
}

#[tokio::test]
async fn health_check_reports_status() {
    let addr = spawn_service().await;
    let client = client_for(addr, "/predict", "file");

    let health = client.health_check().await.unwrap();

    assert_eq!(health.status, "API is running");
}

#[tokio::test]
async fn pipeline_over_http() {
    let addr = spawn_service().await;
    let mut pipeline = Pipeline::new(client_for(addr, "/predict", "file"), TableIngestor::default());

    let table = pipeline
        .select_file("transactions.csv", SAMPLE_CSV.as_bytes())
        .unwrap();
    assert_eq!(table.row_count(), 3);

    let analysis = pipeline.analyze().await.unwrap();

    assert_eq!(analysis.file_name, "transactions.csv");
    assert_eq!(analysis.results.len(), 3);
    assert_eq!(
        analysis.results.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(analysis.results[2].prediction, Prediction::Fraud);
    assert_eq!(analysis.summary.total_transactions, 3);
    assert_eq!(analysis.summary.client_computed.fraudulent_count, 1);
    assert!(analysis.summary.is_consistent());
    assert!((analysis.summary.avg_risk_score - 46.666666666666664).abs() < 1e-9);

    let histogram: HistogramBins = analysis.histogram();
    assert_eq!(histogram.counts(), [1, 0, 1, 0, 1]);

    let exported = analysis.export();
    assert!(exported.lines().nth(3).unwrap().starts_with("3,"));

    assert!(matches!(pipeline.session().state(), SessionState::Results { .. }));
}

#[tokio::test]
async fn pipeline_recovers_after_unreachable_service() {
    let mut pipeline = Pipeline::new(
        ScoringClient::new(&ScoringConfig {
            endpoint: "http://127.0.0.1:9/predict".to_string(),
            health_endpoint: "http://127.0.0.1:9/".to_string(),
            timeout_secs: 2,
            file_field: "file".to_string(),
        })
        .unwrap(),
        TableIngestor::default(),
    );

    pipeline
        .select_file("transactions.csv", SAMPLE_CSV.as_bytes())
        .unwrap();
    let err = pipeline.analyze().await.unwrap_err();

    assert!(matches!(err, PipelineError::AnalysisFailed(_)));
    assert!(pipeline.session().can_analyze());
    assert!(pipeline.session().analysis().is_none());
}
