//! Exercises the upload router in-process

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use upload_bench_core::constants::{TOTAL_DURATION_HEADER, TOTAL_MEMORY_DELTA_HEADER};
use upload_bench_core::core::ServerConfig;
use upload_bench_core::{Endpoint, ServerResponse};
use upload_bench_server::{create_router, AppState};

const BOUNDARY: &str = "upload-bench-test-boundary";

fn router_with(config: ServerConfig) -> Router {
    create_router(AppState::new(config))
}

fn router() -> Router {
    router_with(ServerConfig::default())
}

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

fn multipart_request(path: &str, field: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"test.bin\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::post(path)
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

fn raw_request(path: &str, data: Vec<u8>) -> Request<Body> {
    Request::post(path)
        .header(CONTENT_TYPE, "application/octet-stream")
        .body(Body::from(data))
        .unwrap()
}

fn header_f64(response: &Response, name: &str) -> f64 {
    response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("missing header {name}"))
        .to_str()
        .unwrap()
        .parse()
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn upload(router: Router, endpoint: Endpoint, len: usize) -> ServerResponse {
    let data = payload(len);
    let request = match endpoint {
        Endpoint::AsyncStream => raw_request(&endpoint.path(), data),
        _ => multipart_request(&endpoint.path(), "file", &data),
    };
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK, "{endpoint} failed");

    let duration = header_f64(&response, TOTAL_DURATION_HEADER);
    assert!(duration >= 0.0);
    let _ = header_f64(&response, TOTAL_MEMORY_DELTA_HEADER);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn every_endpoint_counts_the_uploaded_bytes() {
    for endpoint in Endpoint::all() {
        let body = upload(router(), endpoint, 300_000).await;

        assert_eq!(body.endpoint, endpoint.name());
        assert_eq!(body.file_size_bytes, 300_000);
        assert!((body.file_size_mb - 300_000.0 / 1_048_576.0).abs() < 1e-12);
        assert!(body.handler_duration_seconds >= 0.0);
        assert!(body.memory_start_mb > 0.0);
        assert!((body.memory_delta_mb - (body.memory_end_mb - body.memory_start_mb)).abs() < 1e-9);
    }
}

#[tokio::test]
async fn spooled_uploads_survive_rolling_to_disk() {
    let config = ServerConfig {
        spool_max_bytes: 4096,
        chunk_size: 1000,
        ..ServerConfig::default()
    };

    for endpoint in [Endpoint::SyncUploadfile, Endpoint::AsyncUploadfile] {
        let body = upload(router_with(config.clone()), endpoint, 123_457).await;
        assert_eq!(body.file_size_bytes, 123_457);
    }
}

#[tokio::test]
async fn empty_uploads_are_accepted() {
    for endpoint in Endpoint::all() {
        let body = upload(router(), endpoint, 0).await;
        assert_eq!(body.file_size_bytes, 0);
        assert_eq!(body.file_size_mb, 0.0);
    }
}

#[tokio::test]
async fn missing_file_field_is_rejected_with_timing_headers() {
    let request = multipart_request(&Endpoint::AsyncFile.path(), "document", &payload(10));
    let response = router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(header_f64(&response, TOTAL_DURATION_HEADER) >= 0.0);

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["details"]["field"], "file");
}

#[tokio::test]
async fn non_multipart_body_is_a_bad_request() {
    let request = raw_request(&Endpoint::SyncUploadfile.path(), payload(10));
    let response = router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["success"], false);
}

#[tokio::test]
async fn body_limit_applies_to_buffered_uploads() {
    let config = ServerConfig {
        max_body_bytes: 1024,
        ..ServerConfig::default()
    };
    let request = multipart_request(&Endpoint::SyncFile.path(), "file", &payload(64 * 1024));
    let response = router_with(config).oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn health_and_root_describe_the_service() {
    let response = router()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");

    let response = router()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["endpoints"].as_array().unwrap().len(), 5);
    assert_eq!(body["endpoints"][0], "/upload/sync-file");
}
