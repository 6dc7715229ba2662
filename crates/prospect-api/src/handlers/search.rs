//! Company and individual search handlers

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use prospect_core::{CompanyQuery, CompanyRecord, IndividualQuery, IndividualRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Message returned alongside an empty result list
pub const NO_RESULTS_MESSAGE: &str = "No results found";

// ============================================================================
// Company search
// ============================================================================

/// Company search request body
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CompanySearchRequest {
    /// Company name (required)
    #[schema(example = "Acme Holdings")]
    pub company_name: Option<String>,
    #[schema(example = "01234567")]
    pub company_registration_number: Option<String>,
    #[schema(example = "United Kingdom")]
    pub country: Option<String>,
    #[schema(example = "Financial services")]
    pub industry: Option<String>,
}

impl From<CompanySearchRequest> for CompanyQuery {
    fn from(req: CompanySearchRequest) -> Self {
        CompanyQuery {
            company_name: req.company_name.unwrap_or_default(),
            company_registration_number: non_blank(req.company_registration_number),
            country: non_blank(req.country),
            industry: non_blank(req.industry),
        }
    }
}

/// Company candidate; unknown fields are empty strings
#[derive(Debug, Serialize, ToSchema)]
pub struct CompanyResult {
    #[schema(example = "Acme Holdings Ltd")]
    pub company_name: String,
    pub company_registration_number: String,
    pub country: String,
    pub industry: String,
    pub website_url: String,
    pub source_url: String,
}

impl From<CompanyRecord> for CompanyResult {
    fn from(record: CompanyRecord) -> Self {
        Self {
            company_name: record.company_name,
            company_registration_number: record.company_registration_number,
            country: record.country,
            industry: record.industry,
            website_url: record.website_url,
            source_url: record.source_url,
        }
    }
}

/// Company search response
#[derive(Debug, Serialize, ToSchema)]
pub struct CompanySearchResponse {
    /// Present only when nothing was found
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "No results found")]
    pub message: Option<String>,
    pub results: Vec<CompanyResult>,
}

/// Search the web for companies
#[utoipa::path(
    post,
    path = "/api/search/companies",
    tag = "search",
    request_body = CompanySearchRequest,
    responses(
        (status = 200, description = "Search completed", body = CompanySearchResponse),
        (status = 400, description = "Missing company name or invalid body", body = crate::error::ApiError),
        (status = 502, description = "Upstream unreachable", body = crate::error::ApiError),
        (status = 500, description = "Internal error", body = crate::error::ApiError)
    )
)]
pub async fn search_companies(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CompanySearchRequest>, JsonRejection>,
) -> Result<Json<CompanySearchResponse>, AppError> {
    state.increment_requests();

    let Json(req) = payload?;
    let query = CompanyQuery::from(req);
    let outcome = state.search.search_companies(&query).await?;

    let (message, results) = with_empty_message(outcome.records);
    Ok(Json(CompanySearchResponse { message, results }))
}

// ============================================================================
// Individual search
// ============================================================================

/// Individual search request body
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct IndividualSearchRequest {
    /// Full name (required)
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,
    #[schema(example = "1980-03-05")]
    pub birth_date: Option<String>,
    #[schema(example = "France")]
    pub country: Option<String>,
}

impl From<IndividualSearchRequest> for IndividualQuery {
    fn from(req: IndividualSearchRequest) -> Self {
        IndividualQuery {
            name: req.name.unwrap_or_default(),
            birth_date: non_blank(req.birth_date),
            country: non_blank(req.country),
        }
    }
}

/// Individual candidate; unknown fields are empty strings
#[derive(Debug, Serialize, ToSchema)]
pub struct IndividualResult {
    #[schema(example = "Jane")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    pub birth_date: String,
    pub country: String,
    pub profile_image_url: String,
    pub source_url: String,
}

impl From<IndividualRecord> for IndividualResult {
    fn from(record: IndividualRecord) -> Self {
        Self {
            first_name: record.first_name,
            last_name: record.last_name,
            birth_date: record.birth_date,
            country: record.country,
            profile_image_url: record.profile_image_url,
            source_url: record.source_url,
        }
    }
}

/// Individual search response
#[derive(Debug, Serialize, ToSchema)]
pub struct IndividualSearchResponse {
    /// Present only when nothing was found
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "No results found")]
    pub message: Option<String>,
    pub results: Vec<IndividualResult>,
}

/// Search the web for individuals
#[utoipa::path(
    post,
    path = "/api/search/individuals",
    tag = "search",
    request_body = IndividualSearchRequest,
    responses(
        (status = 200, description = "Search completed", body = IndividualSearchResponse),
        (status = 400, description = "Missing name or invalid body", body = crate::error::ApiError),
        (status = 502, description = "Upstream unreachable", body = crate::error::ApiError),
        (status = 500, description = "Internal error", body = crate::error::ApiError)
    )
)]
pub async fn search_individuals(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IndividualSearchRequest>, JsonRejection>,
) -> Result<Json<IndividualSearchResponse>, AppError> {
    state.increment_requests();

    let Json(req) = payload?;
    let query = IndividualQuery::from(req);
    let outcome = state.search.search_individuals(&query).await?;

    let (message, results) = with_empty_message(outcome.records);
    Ok(Json(IndividualSearchResponse { message, results }))
}

fn with_empty_message<R, T: From<R>>(records: Vec<R>) -> (Option<String>, Vec<T>) {
    let message = records
        .is_empty()
        .then(|| NO_RESULTS_MESSAGE.to_string());
    (message, records.into_iter().map(T::from).collect())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
