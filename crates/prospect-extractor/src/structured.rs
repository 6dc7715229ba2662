//! Structured-block detection
//!
//! Finds the JSON payload an upstream model was asked to return, wherever it
//! ended up in the response: a fenced ```` ```json ```` block first, then the
//! first bracketed array, then the first brace-delimited object.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```json(.*?)```").expect("valid fenced block regex"));
static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\[.*?\]").expect("valid array span regex"));
static BRACED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*?\}").expect("valid object span regex"));

/// Where a structured block was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Fenced,
    Array,
    Object,
}

/// The structured payload of a response, as decoded JSON
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Array elements that are JSON objects, in order
    Objects(Vec<Map<String, Value>>),
    /// A lone object
    Object(Map<String, Value>),
}

/// Locate and decode the first structured block
///
/// Only the highest-priority match is tried. `None` when nothing matches,
/// the match is not valid JSON, or it decodes to something without objects
/// (for example a citation marker such as `[1]`).
pub fn find_block(content: &str) -> Option<(BlockKind, Block)> {
    let (kind, value) = locate(content)?;
    let block = match value {
        Value::Array(items) => {
            let total = items.len();
            let objects: Vec<Map<String, Value>> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect();
            if total > 0 && objects.is_empty() {
                return None;
            }
            Block::Objects(objects)
        }
        Value::Object(map) => Block::Object(map),
        _ => return None,
    };
    Some((kind, block))
}

fn locate(content: &str) -> Option<(BlockKind, Value)> {
    if let Some(caps) = FENCED_JSON.captures(content) {
        let body = caps.get(1).map_or("", |m| m.as_str());
        return serde_json::from_str(body.trim())
            .ok()
            .map(|value| (BlockKind::Fenced, value));
    }

    if let Some(span) = BRACKETED.find(content) {
        return parse_from(content, span.start()).map(|value| (BlockKind::Array, value));
    }

    if let Some(span) = BRACED.find(content) {
        return parse_from(content, span.start()).map(|value| (BlockKind::Object, value));
    }

    None
}

/// Decode the one JSON value starting at `start`, ignoring trailing prose
fn parse_from(content: &str, start: usize) -> Option<Value> {
    serde_json::Deserializer::from_str(&content[start..])
        .into_iter::<Value>()
        .next()?
        .ok()
}

/// Value of the first alias holding a non-empty string or a number
pub fn aliased_field(object: &Map<String, Value>, aliases: &[&str]) -> String {
    aliases
        .iter()
        .filter_map(|alias| object.get(*alias))
        .find_map(text_value)
        .unwrap_or_default()
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
