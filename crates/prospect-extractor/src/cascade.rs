//! The tier cascade
//!
//! Tiers are evaluated in a fixed order; the first one that decides ends
//! extraction. A tier passes by returning `None`.

use std::fmt;

use once_cell::unsync::OnceCell;
use prospect_core::ImageRef;
use serde::Serialize;
use tracing::{debug, debug_span, trace};

use crate::harvest::Harvest;
use crate::lines::normalize_line;
use crate::structured::{find_block, Block};
use crate::RecordKind;

/// Phrases with which upstream reports that it found nothing
pub const NEGATIVE_PHRASES: [&str; 3] = [
    "no information available",
    "could not find",
    "no results found",
];

/// Stage of the cascade that produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    StructuredBlock,
    NegativeResult,
    LineHeuristic,
    QueryFallback,
}

impl Tier {
    /// Tiers that may pass, in priority order. `QueryFallback` always decides
    /// and terminates the cascade.
    pub const CASCADE: [Tier; 3] = [
        Tier::StructuredBlock,
        Tier::NegativeResult,
        Tier::LineHeuristic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StructuredBlock => "structured_block",
            Self::NegativeResult => "negative_result",
            Self::LineHeuristic => "line_heuristic",
            Self::QueryFallback => "query_fallback",
        }
    }

    fn run<K: RecordKind>(self, input: &Input<'_, K>) -> Option<Vec<K::Record>> {
        match self {
            Self::StructuredBlock => structured_tier(input),
            Self::NegativeResult => negative_tier(input.content),
            Self::LineHeuristic => line_tier(input),
            Self::QueryFallback => Some(vec![K::fallback(input.query, input.harvest())]),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records plus the tier that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction<R> {
    pub records: Vec<R>,
    pub tier: Tier,
}

impl<R> Extraction<R> {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

struct Input<'a, K: RecordKind> {
    content: &'a str,
    query: &'a K::Query,
    images: &'a [ImageRef],
    harvest: OnceCell<Harvest>,
}

impl<K: RecordKind> Input<'_, K> {
    fn harvest(&self) -> &Harvest {
        self.harvest.get_or_init(|| K::harvest(self.content, self.images))
    }
}

/// Run the cascade for record kind `K`
pub fn extract<K: RecordKind>(
    content: &str,
    query: &K::Query,
    images: &[ImageRef],
) -> Extraction<K::Record> {
    let span = debug_span!("extract", kind = K::KIND, content_len = content.len());
    let _enter = span.enter();

    let input = Input::<K> {
        content,
        query,
        images,
        harvest: OnceCell::new(),
    };

    let (tier, records) = Tier::CASCADE
        .into_iter()
        .find_map(|tier| {
            let decided = tier.run(&input);
            if decided.is_none() {
                trace!(%tier, "tier passed");
            }
            decided.map(|records| (tier, records))
        })
        .unwrap_or_else(|| {
            let tier = Tier::QueryFallback;
            (tier, tier.run(&input).unwrap_or_default())
        });

    debug!(%tier, records = records.len(), "extraction decided");
    Extraction { records, tier }
}

fn structured_tier<K: RecordKind>(input: &Input<'_, K>) -> Option<Vec<K::Record>> {
    let (kind, block) = find_block(input.content)?;
    trace!(block = ?kind, "structured block decoded");

    let records = match block {
        Block::Objects(objects) => objects
            .iter()
            .enumerate()
            .map(|(index, object)| K::from_object(object, index, input.images))
            .collect(),
        Block::Object(object) => vec![K::from_object(&object, 0, input.images)],
    };
    Some(records)
}

fn negative_tier<R>(content: &str) -> Option<Vec<R>> {
    let lower = content.to_lowercase();
    NEGATIVE_PHRASES
        .iter()
        .any(|phrase| lower.contains(phrase))
        .then(Vec::new)
}

fn line_tier<K: RecordKind>(input: &Input<'_, K>) -> Option<Vec<K::Record>> {
    let mut records = Vec::new();
    let mut current: Option<K::Record> = None;

    for raw in input.content.lines() {
        let line = normalize_line(raw);
        if line.is_empty() {
            continue;
        }

        if K::opens_record(&line) {
            if let Some(done) = current.take().filter(K::is_eligible) {
                records.push(done);
            }
            current = Some(K::open_record(&line));
        } else if let Some(record) = current.as_mut() {
            K::read_detail(&line, record);
        }
    }

    if let Some(done) = current.take().filter(K::is_eligible) {
        records.push(done);
    }

    if records.is_empty() {
        return None;
    }

    let harvest = input.harvest();
    for (index, record) in records.iter_mut().enumerate() {
        K::assign_harvested(record, index, harvest);
    }
    Some(records)
}

// ============================================================================
// Tests
// ============================================================================
