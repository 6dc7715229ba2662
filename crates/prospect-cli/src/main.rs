//! Prospect CLI - Command-line interface
//!
//! Usage:
//!   prospect extract company --input response.txt --name "Acme"
//!   prospect extract individual --input - --name "Jane Doe" --images a.jpg,b.jpg
//!   prospect search company --name "Acme" --country "Germany"
//!   prospect search individual --name "Jane Doe"

use std::io::Read;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use prospect_core::{AppConfig, CompanyQuery, ImageRef, IndividualQuery};
use prospect_extractor::{extract, Company, Extraction, Individual, Tier};
use prospect_search::{PerplexityClient, RetryPolicy, SearchService};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "prospect")]
#[command(about = "Company and individual profile search")]
#[command(version)]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract records from a saved upstream response
    Extract {
        #[command(subcommand)]
        kind: ExtractKind,
    },
    /// Search through the upstream API (needs PERPLEXITY_API_KEY)
    Search {
        #[command(subcommand)]
        kind: SearchKind,
    },
}

#[derive(Subcommand)]
enum ExtractKind {
    /// Extract companies
    Company {
        /// Response file, or `-` for stdin
        #[arg(short, long)]
        input: String,
        #[command(flatten)]
        query: CompanyArgs,
    },
    /// Extract individuals
    Individual {
        /// Response file, or `-` for stdin
        #[arg(short, long)]
        input: String,
        /// Image URLs returned next to the response, comma-separated
        #[arg(long, value_delimiter = ',')]
        images: Vec<String>,
        #[command(flatten)]
        query: IndividualArgs,
    },
}

#[derive(Subcommand)]
enum SearchKind {
    /// Search companies
    Company(CompanyArgs),
    /// Search individuals
    Individual(IndividualArgs),
}

#[derive(Args)]
struct CompanyArgs {
    /// Company name
    #[arg(short, long)]
    name: String,
    #[arg(long)]
    registration_number: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    industry: Option<String>,
}

impl From<CompanyArgs> for CompanyQuery {
    fn from(args: CompanyArgs) -> Self {
        CompanyQuery {
            company_name: args.name,
            company_registration_number: args.registration_number,
            country: args.country,
            industry: args.industry,
        }
    }
}

#[derive(Args)]
struct IndividualArgs {
    /// Full name
    #[arg(short, long)]
    name: String,
    #[arg(long)]
    birth_date: Option<String>,
    #[arg(long)]
    country: Option<String>,
}

impl From<IndividualArgs> for IndividualQuery {
    fn from(args: IndividualArgs) -> Self {
        IndividualQuery {
            name: args.name,
            birth_date: args.birth_date,
            country: args.country,
        }
    }
}

/// JSON printed for every command
#[derive(Debug, Serialize)]
struct Report<R> {
    tier: Tier,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    results: Vec<R>,
}

impl<R> Report<R> {
    fn new(records: Vec<R>, tier: Tier) -> Self {
        Self {
            tier,
            message: records.is_empty().then_some("No results found"),
            results: records,
        }
    }
}

impl<R> From<Extraction<R>> for Report<R> {
    fn from(extraction: Extraction<R>) -> Self {
        Self::new(extraction.records, extraction.tier)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let output = match cli.command {
        Commands::Extract { kind } => match kind {
            ExtractKind::Company { input, query } => {
                let content = read_input(&input)?;
                let report = Report::from(extract::<Company>(&content, &query.into(), &[]));
                render(&report, cli.pretty)?
            }
            ExtractKind::Individual {
                input,
                images,
                query,
            } => {
                let content = read_input(&input)?;
                let images: Vec<ImageRef> = images.into_iter().map(ImageRef::new).collect();
                let report = Report::from(extract::<Individual>(&content, &query.into(), &images));
                render(&report, cli.pretty)?
            }
        },
        Commands::Search { kind } => {
            let service = search_service()?;
            match kind {
                SearchKind::Company(args) => {
                    let outcome = service.search_companies(&args.into()).await?;
                    render(&Report::new(outcome.records, outcome.tier), cli.pretty)?
                }
                SearchKind::Individual(args) => {
                    let outcome = service.search_individuals(&args.into()).await?;
                    render(&Report::new(outcome.records, outcome.tier), cli.pretty)?
                }
            }
        }
    };

    println!("{output}");
    Ok(())
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("failed to read stdin")?;
        return Ok(content);
    }
    std::fs::read_to_string(input).with_context(|| format!("failed to read {input}"))
}

fn search_service() -> anyhow::Result<SearchService> {
    let config = AppConfig::from_env()?;
    let client = PerplexityClient::from_config(&config.upstream)?;
    Ok(SearchService::new(Arc::new(client), config.upstream.clone())
        .with_retry(RetryPolicy::from_config(&config.retry)))
}

fn render<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
