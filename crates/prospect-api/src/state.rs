//! Application state management

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use prospect_core::{AppConfig, ConfigError, Result};
use prospect_search::{
    Completion, CompletionClient, CompletionRequest, PerplexityClient, RetryPolicy, SearchService,
};

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
    /// Whether an upstream API key was configured
    pub upstream_configured: bool,
    /// Search orchestration
    pub search: SearchService,
}

impl AppState {
    /// Create state around an explicit completion backend
    pub fn new(config: AppConfig, client: Arc<dyn CompletionClient>) -> Self {
        let search = SearchService::new(client, config.upstream.clone())
            .with_retry(RetryPolicy::from_config(&config.retry));

        Self {
            upstream_configured: true,
            search,
            config,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        }
    }

    /// Create state with the Perplexity client from config
    ///
    /// Without an API key the server still starts; searches then fail with a
    /// configuration error after input validation.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let missing_key = config.upstream.require_api_key().err();
        if let Some(err) = missing_key {
            tracing::warn!(error = %err, "Upstream API key missing; searches will fail");
            let mut state = Self::new(config, Arc::new(MissingApiKey));
            state.upstream_configured = false;
            return Ok(state);
        }

        let client = PerplexityClient::from_config(&config.upstream)?;
        Ok(Self::new(config, Arc::new(client)))
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// Stand-in backend used when no API key is configured
struct MissingApiKey;

#[async_trait]
impl CompletionClient for MissingApiKey {
    async fn complete(&self, _request: CompletionRequest) -> Result<Completion> {
        Err(ConfigError::MissingRequired("PERPLEXITY_API_KEY".to_string()).into())
    }
}
