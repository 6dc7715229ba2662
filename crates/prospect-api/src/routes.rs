//! API route definitions

use crate::handlers::search;
use crate::state::AppState;
use axum::{routing::post, Router};
use std::sync::Arc;

/// Routes nested under `/api`
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/search/companies", post(search::search_companies))
        .route("/search/individuals", post(search::search_individuals))
}
