// Shared test helpers for service mocks and sample records.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use site_analyzer::api::ApiClient;
use site_analyzer::ResultRecord;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds an `ApiClient` pointed at a mock server.
#[allow(dead_code)] // Used by other test files
pub fn client_for(server: &MockServer) -> Arc<ApiClient> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("Failed to build HTTP client");
    Arc::new(ApiClient::new(&server.uri(), http).expect("mock server URI is valid"))
}

/// Mounts `POST /api/analyze` answering with `task_id`.
#[allow(dead_code)]
pub async fn mount_submit(server: &MockServer, task_id: &str) {
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"task_id": task_id, "message": "Analysis started"})),
        )
        .mount(server)
        .await;
}

/// Mounts one status response for `task_id`, served `times` times before the
/// next mounted response takes over.
#[allow(dead_code)]
pub async fn mount_status(server: &MockServer, task_id: &str, body: Value, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/api/analysis/{task_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .up_to_n_times(times)
        .mount(server)
        .await;
}

/// Records as the service reports them: one healthy site and one failure.
#[allow(dead_code)]
pub fn sample_records() -> Vec<Value> {
    vec![
        json!({
            "url": "https://example.com",
            "ip": "93.184.216.34",
            "dns": 12.5,
            "tcp": 20,
            "ssl": 31,
            "ttfb": 80,
            "total": 143.5,
            "size_kb": 512,
            "ssl_score": 95,
            "ssl_score_breakdown": {
                "Valid Certificate": 40,
                "Certificate Expiry": 25,
                "TLS Version (TLSv1.3)": 20,
                "Cipher Strength": 10
            },
            "security_headers_score": 70,
            "security_headers_missing": ["Content-Security-Policy"],
            "cdn_provider": "Cloudflare",
            "server_location": "US",
            "compression_type": "gzip"
        }),
        json!({
            "url": "https://down.example",
            "error": "Connection timed out",
            "total": null,
            "ssl_score": null,
            "cdn_provider": "None detected"
        }),
    ]
}

/// `sample_records` decoded into records.
#[allow(dead_code)]
pub fn sample_result_records() -> Vec<ResultRecord> {
    serde_json::from_value(Value::Array(sample_records())).expect("sample records decode")
}
