//! Prospect Core - Domain models, errors, and shared types
//!
//! This crate defines the core abstractions used throughout Prospect:
//! - Search queries for companies and individuals
//! - Extracted profile records (the two record variants)
//! - Common error types
//! - Configuration management

pub mod config;

pub use config::{
    AppConfig, ConfigError, LoggingConfig, RetryConfig, ServerConfig, UpstreamConfig,
};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for Prospect operations
#[derive(Error, Debug)]
pub enum ProspectError {
    /// Caller input rejected before any upstream call
    #[error("{0}")]
    Validation(String),

    /// Upstream answered with a non-success status
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// Upstream could not be reached (connect failure, timeout, broken body)
    #[error("Upstream transport error: {0}")]
    Transport(String),

    /// Upstream answered 2xx but the payload was not a usable completion
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProspectError {
    /// Whether another attempt against upstream could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Upstream { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<ConfigError> for ProspectError {
    fn from(err: ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProspectError>;

// ============================================================================
// Search Queries
// ============================================================================

/// Company search parameters as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyQuery {
    /// Company name (required, validated by the search service)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub company_name: String,

    pub company_registration_number: Option<String>,

    pub country: Option<String>,

    pub industry: Option<String>,
}

impl CompanyQuery {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            ..Default::default()
        }
    }

    pub fn with_registration_number(mut self, number: impl Into<String>) -> Self {
        self.company_registration_number = Some(number.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }
}

/// Individual search parameters as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualQuery {
    /// Full name (required, validated by the search service)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,

    pub birth_date: Option<String>,

    pub country: Option<String>,
}

impl IndividualQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_birth_date(mut self, birth_date: impl Into<String>) -> Self {
        self.birth_date = Some(birth_date.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }
}

/// Treat an explicit JSON `null` like a missing field
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Split a full name on the first run of whitespace into (first, last)
///
/// The last name keeps everything after the first word, so
/// "Mary Ann Smith" becomes ("Mary", "Ann Smith").
pub fn split_full_name(full_name: &str) -> (String, String) {
    let trimmed = full_name.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim_start().to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}

// ============================================================================
// Upstream Content
// ============================================================================

/// Image reference returned next to an upstream completion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
}

impl ImageRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

// ============================================================================
// Extracted Records
// ============================================================================

/// Company candidate; unknown fields are empty strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyRecord {
    pub company_name: String,
    pub company_registration_number: String,
    pub country: String,
    pub industry: String,
    pub website_url: String,
    pub source_url: String,
}

impl CompanyRecord {
    pub fn has_name(&self) -> bool {
        !self.company_name.is_empty()
    }
}

/// Individual candidate; unknown fields are empty strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndividualRecord {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub country: String,
    pub profile_image_url: String,
    pub source_url: String,
}

impl IndividualRecord {
    pub fn has_name(&self) -> bool {
        !self.first_name.is_empty() || !self.last_name.is_empty()
    }

    /// First and last name joined with a space
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (true, true) => String::new(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
