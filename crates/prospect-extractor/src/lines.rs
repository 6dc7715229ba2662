//! Line-oriented helpers shared by the record kinds

use once_cell::sync::Lazy;
use regex::Regex;

static ORDINAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s").expect("valid ordinal regex"));
static BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:#{1,6}|[-*+•])\s+").expect("valid bullet regex"));

/// Strip markdown decoration so field markers line up
///
/// `"- **Country**: France"` becomes `"Country: France"` and
/// `"### 2. **Acme Ltd**"` becomes `"2. Acme Ltd"`.
pub fn normalize_line(line: &str) -> String {
    let mut text = line.trim();
    while let Some(m) = BULLET.find(text) {
        text = text[m.end()..].trim_start();
    }
    text.replace("**", "").replace("__", "").trim().to_string()
}

/// Whether the line starts with `N. `
pub fn is_ordinal(line: &str) -> bool {
    ORDINAL.is_match(line)
}

/// Case-insensitive substring test against a lowercase needle
pub fn mentions(line: &str, needle: &str) -> bool {
    line.to_lowercase().contains(needle)
}

/// First non-empty capture group 1 across `patterns`, trimmed
pub fn first_capture(line: &str, patterns: &[&Regex]) -> Option<String> {
    patterns.iter().find_map(|pattern| {
        pattern
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    })
}
