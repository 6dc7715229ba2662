//! Prospect Search - AI web search for company and individual profiles
//!
//! This crate orchestrates one search:
//! 1. validate the query
//! 2. build the upstream prompt
//! 3. call the chat-completion backend (with bounded retry)
//! 4. extract candidate records from the returned text

use std::sync::Arc;
use std::time::Instant;

use prospect_core::{
    CompanyQuery, CompanyRecord, IndividualQuery, IndividualRecord, ProspectError, Result,
    UpstreamConfig,
};
use prospect_extractor::{extract, Company, Individual, Tier};

pub mod client;
pub mod prompt;
pub mod retry;

pub use client::{Completion, CompletionClient, CompletionRequest, Message, PerplexityClient};
pub use prompt::{company_prompt, individual_prompt, PromptBuilder, SearchPrompt};
pub use retry::RetryPolicy;

/// Records found by one search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome<R> {
    pub records: Vec<R>,
    /// Extraction tier that produced the records
    pub tier: Tier,
}

impl<R> SearchOutcome<R> {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Runs searches against an upstream completion backend
#[derive(Clone)]
pub struct SearchService {
    client: Arc<dyn CompletionClient>,
    upstream: UpstreamConfig,
    retry: RetryPolicy,
}

impl SearchService {
    pub fn new(client: Arc<dyn CompletionClient>, upstream: UpstreamConfig) -> Self {
        Self {
            client,
            upstream,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Search for companies matching the query
    pub async fn search_companies(
        &self,
        query: &CompanyQuery,
    ) -> Result<SearchOutcome<CompanyRecord>> {
        require_name(&query.company_name, "Company name is required")?;

        let request = CompletionRequest::from_prompt(company_prompt(query), &self.upstream);
        let completion = self.complete("search_companies", request).await?;

        let extraction = extract::<Company>(&completion.content, query, &[]);
        tracing::info!(
            tier = %extraction.tier,
            results = extraction.records.len(),
            "Company search completed"
        );

        Ok(SearchOutcome {
            records: extraction.records,
            tier: extraction.tier,
        })
    }

    /// Search for individuals matching the query, asking upstream for images
    pub async fn search_individuals(
        &self,
        query: &IndividualQuery,
    ) -> Result<SearchOutcome<IndividualRecord>> {
        require_name(&query.name, "Name is required")?;

        let request =
            CompletionRequest::from_prompt(individual_prompt(query), &self.upstream).with_images();
        let completion = self.complete("search_individuals", request).await?;

        let extraction = extract::<Individual>(&completion.content, query, &completion.images);
        tracing::info!(
            tier = %extraction.tier,
            results = extraction.records.len(),
            images = completion.images.len(),
            "Individual search completed"
        );

        Ok(SearchOutcome {
            records: extraction.records,
            tier: extraction.tier,
        })
    }

    async fn complete(&self, operation: &str, request: CompletionRequest) -> Result<Completion> {
        let start = Instant::now();
        tracing::debug!(
            operation,
            prompt_len = request.messages.iter().map(|m| m.content.len()).sum::<usize>(),
            "Calling upstream"
        );

        let completion = self
            .retry
            .retry(operation, || self.client.complete(request.clone()))
            .await?;

        tracing::debug!(
            operation,
            content_len = completion.content.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Upstream response received"
        );
        Ok(completion)
    }
}

fn require_name(name: &str, message: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ProspectError::Validation(message.to_string()));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
