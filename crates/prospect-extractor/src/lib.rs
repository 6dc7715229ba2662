//! Prospect Extractor - free-text profile extraction
//!
//! Turns the text an AI web search returns into company or individual
//! records. Upstream output is prompted to be JSON but is not guaranteed to
//! be, so extraction walks a cascade of tiers with decreasing trust in the
//! input's structure:
//!
//! 1. a JSON block (fenced, bare array, or bare object)
//! 2. an explicit "nothing found" phrase
//! 3. line-by-line field markers (`Name:`, `1.`, `Country:`, ...)
//! 4. an echo of the caller's query
//!
//! Extraction is total: any input yields either records or an empty list.

use prospect_core::{
    CompanyQuery, CompanyRecord, ImageRef, IndividualQuery, IndividualRecord,
};
use serde_json::{Map, Value};

pub mod cascade;
pub mod company;
pub mod harvest;
pub mod individual;
pub mod lines;
pub mod structured;

pub use cascade::{extract, Extraction, Tier, NEGATIVE_PHRASES};
pub use company::Company;
pub use harvest::Harvest;
pub use individual::Individual;

/// One record variant and the rules for reading it out of text
///
/// Implemented by zero-sized markers ([`Company`], [`Individual`]); the
/// cascade in [`extract`] is generic over this trait.
pub trait RecordKind {
    /// Search parameters the record is echoed from in the final fallback
    type Query;
    /// Output record
    type Record: Clone + std::fmt::Debug;

    /// Short name used in log fields
    const KIND: &'static str;

    /// Map one JSON object (element `index` of the structured block)
    fn from_object(object: &Map<String, Value>, index: usize, images: &[ImageRef])
        -> Self::Record;

    /// Collect the links the line and fallback tiers assign positionally
    fn harvest(content: &str, images: &[ImageRef]) -> Harvest;

    /// Whether a normalized line starts a new record
    fn opens_record(line: &str) -> bool;

    /// New record with whatever name the opening line carries
    fn open_record(line: &str) -> Self::Record;

    /// Fold one detail line into the open record
    fn read_detail(line: &str, record: &mut Self::Record);

    /// Whether an assembled record is worth returning
    fn is_eligible(record: &Self::Record) -> bool;

    /// Fill gaps in record `index` from the harvested links
    fn assign_harvested(record: &mut Self::Record, index: usize, harvest: &Harvest);

    /// The record echoed from the query when nothing else worked
    fn fallback(query: &Self::Query, harvest: &Harvest) -> Self::Record;
}

/// Extract company candidates from an upstream response
pub fn extract_companies(content: &str, query: &CompanyQuery) -> Vec<CompanyRecord> {
    extract::<Company>(content, query, &[]).records
}

/// Extract individual candidates from an upstream response and its images
pub fn extract_individuals(
    content: &str,
    query: &IndividualQuery,
    images: &[ImageRef],
) -> Vec<IndividualRecord> {
    extract::<Individual>(content, query, images).records
}
