//! API Integration Tests
//!
//! The router runs against a stub completion backend; no network access.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use prospect_api::create_router_with_client;
use prospect_core::{AppConfig, ImageRef, ProspectError, Result, RetryConfig};
use prospect_search::{client::upstream_error, Completion, CompletionClient, CompletionRequest};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Upstream stub returning one fixed reply and counting calls
struct StubClient {
    reply: Box<dyn Fn() -> Result<Completion> + Send + Sync>,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl StubClient {
    fn new(reply: impl Fn() -> Result<Completion> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(reply),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    fn content(content: &'static str) -> Arc<Self> {
        Self::new(move || {
            Ok(Completion {
                content: content.to_string(),
                images: Vec::new(),
            })
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for StubClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);
        (self.reply)()
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        retry: RetryConfig {
            max_retries: 1,
            initial_backoff_ms: 1,
            max_backoff_ms: 1,
        },
        ..Default::default()
    }
}

fn router(client: Arc<StubClient>) -> Router {
    create_router_with_client(test_config(), client)
}

/// Helper to create a test request
fn create_json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = router(StubClient::content("[]"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["upstream_configured"], true);
}

#[tokio::test]
async fn test_openapi_document() {
    let app = router(StubClient::content("[]"));
    let request = Request::builder()
        .uri("/api-docs/openapi.json")
        .body(Body::empty())
        .unwrap();

    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/api/search/companies"]["post"].is_object());
    assert!(json["paths"]["/api/search/individuals"]["post"].is_object());
}

// =============================================================================
// Company Search Tests
// =============================================================================

#[tokio::test]
async fn test_company_search_requires_name() {
    let client = StubClient::content("[]");

    for body in [json!({}), json!({"company_name": ""}), json!({"company_name": null})] {
        let request = create_json_request("POST", "/api/search/companies", Some(body));
        let (status, json) = send(router(client.clone()), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json,
            json!({"statusCode": 400, "message": "Company name is required"})
        );
    }

    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_company_search_success() {
    let client = StubClient::content(
        r#"Found these:
```json
[{"name": "Acme Holdings Ltd", "registration_number": "01234567", "country": "United Kingdom", "sector": "Finance", "website": "https://acme.co.uk"}]
```"#,
    );
    let request = create_json_request(
        "POST",
        "/api/search/companies",
        Some(json!({"company_name": "Acme", "country": "United Kingdom"})),
    );

    let (status, json) = send(router(client.clone()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json.get("message").is_none());
    assert_eq!(
        json["results"],
        json!([{
            "company_name": "Acme Holdings Ltd",
            "company_registration_number": "01234567",
            "country": "United Kingdom",
            "industry": "Finance",
            "website_url": "https://acme.co.uk",
            "source_url": ""
        }])
    );

    let request = client.last_request.lock().unwrap().clone().unwrap();
    assert!(!request.return_images);
    assert!(request.messages[1]
        .content
        .ends_with("Search for: Acme, from United Kingdom"));
}

#[tokio::test]
async fn test_company_search_no_results() {
    let client = StubClient::content("I could not find any registered company by that name.");
    let request = create_json_request(
        "POST",
        "/api/search/companies",
        Some(json!({"company_name": "Ghost Ltd"})),
    );

    let (status, json) = send(router(client), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"message": "No results found", "results": []}));
}

#[tokio::test]
async fn test_company_search_fallback_echoes_query() {
    let client = StubClient::content("Acme appears in several registries; see https://acme.example.com");
    let request = create_json_request(
        "POST",
        "/api/search/companies",
        Some(json!({"company_name": "Acme", "industry": "Retail"})),
    );

    let (status, json) = send(router(client), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["results"][0]["company_name"], "Acme");
    assert_eq!(json["results"][0]["industry"], "Retail");
    assert_eq!(json["results"][0]["website_url"], "https://acme.example.com");
}

// =============================================================================
// Individual Search Tests
// =============================================================================

#[tokio::test]
async fn test_individual_search_requires_name() {
    let client = StubClient::content("[]");
    let request = create_json_request(
        "POST",
        "/api/search/individuals",
        Some(json!({"name": "   ", "country": "France"})),
    );

    let (status, json) = send(router(client.clone()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Name is required");
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_individual_search_success() {
    let client = StubClient::new(|| {
        Ok(Completion {
            content: "1. Jane Doe\nCountry: France".to_string(),
            images: vec![ImageRef::new("https://img.example.com/jane.jpg")],
        })
    });
    let request = create_json_request(
        "POST",
        "/api/search/individuals",
        Some(json!({"name": "Jane Doe"})),
    );

    let (status, json) = send(router(client.clone()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["results"],
        json!([{
            "first_name": "Jane",
            "last_name": "Doe",
            "birth_date": "",
            "country": "France",
            "profile_image_url": "https://img.example.com/jane.jpg",
            "source_url": ""
        }])
    );

    let request = client.last_request.lock().unwrap().clone().unwrap();
    assert!(request.return_images);
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let client = StubClient::content("[]");
    let request = Request::builder()
        .method("POST")
        .uri("/api/search/companies")
        .header("Content-Type", "application/json")
        .body(Body::from("{\"company_name\": "))
        .unwrap();

    let (status, json) = send(router(client.clone()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["statusCode"], 400);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_upstream_status_is_propagated() {
    let client = StubClient::new(|| Err(upstream_error(401, Some("Unauthorized"), "invalid api key")));
    let request = create_json_request(
        "POST",
        "/api/search/individuals",
        Some(json!({"name": "Jane Doe"})),
    );

    let (status, json) = send(router(client.clone()), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["statusCode"], 401);
    assert_eq!(
        json["message"],
        "Upstream API error: Unauthorized. Details: invalid api key"
    );
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_transport_failure_is_bad_gateway_after_retry() {
    let client = StubClient::new(|| Err(ProspectError::Transport("connection refused".to_string())));
    let request = create_json_request(
        "POST",
        "/api/search/companies",
        Some(json!({"company_name": "Acme"})),
    );

    let (status, json) = send(router(client.clone()), request).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["statusCode"], 502);
    // One retry configured
    assert_eq!(client.calls(), 2);
}
