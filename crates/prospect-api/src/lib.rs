//! Prospect API - HTTP server for company and individual searches
//!
//! Exposes the search service over REST with an OpenAPI document and
//! Swagger UI.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::get,
    Router,
};
use prospect_core::{AppConfig, ServerConfig};
use prospect_search::CompletionClient;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{health, search};
use crate::state::AppState;

/// OpenAPI document
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Prospect API",
        description = "AI web search for company and individual profiles"
    ),
    paths(
        health::health_check,
        search::search_companies,
        search::search_individuals,
    ),
    components(schemas(
        health::HealthResponse,
        search::CompanySearchRequest,
        search::CompanySearchResponse,
        search::CompanyResult,
        search::IndividualSearchRequest,
        search::IndividualSearchResponse,
        search::IndividualResult,
        error::ApiError,
    )),
    tags(
        (name = "search", description = "Profile search"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Build the application router around shared state
pub fn create_router(state: Arc<AppState>) -> Router {
    let server = state.config.server.clone();

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", routes::api_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(axum::middleware::from_fn(
            middleware::request_context_middleware,
        ))
        .layer(DefaultBodyLimit::max(server.max_body_size))
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_secs,
        )))
        .layer(cors_layer(&server))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router over an explicit completion backend, for tests and embedding
pub fn create_router_with_client(config: AppConfig, client: Arc<dyn CompletionClient>) -> Router {
    create_router(Arc::new(AppState::new(config, client)))
}

/// CORS from configured origins; none or `*` allows any origin
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    if server.cors_origins.is_empty() || server.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
