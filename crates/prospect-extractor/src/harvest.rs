//! URL harvesting
//!
//! Collects `http(s)` links from free text and sorts them into website
//! candidates and image candidates for positional assignment.

use once_cell::sync::Lazy;
use prospect_core::ImageRef;
use regex::Regex;

static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)https?://\S+").expect("valid url regex"));

const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];

const TRAILING_PUNCTUATION: [char; 10] = ['.', ',', ';', ':', '!', '?', '"', '\'', '>', '*'];

/// Website candidates kept for company content
pub const COMPANY_WEBSITE_LIMIT: usize = 5;
/// Website candidates kept for individual content
pub const INDIVIDUAL_WEBSITE_LIMIT: usize = 3;
/// Image candidates scraped from individual content
pub const SCRAPED_IMAGE_LIMIT: usize = 3;

/// Links harvested from one response body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Harvest {
    pub websites: Vec<String>,
    pub images: Vec<String>,
}

impl Harvest {
    /// Every link in order, capped; no image split
    pub fn for_companies(content: &str) -> Self {
        Self {
            websites: find_urls(content)
                .into_iter()
                .take(COMPANY_WEBSITE_LIMIT)
                .collect(),
            images: Vec::new(),
        }
    }

    /// Non-image links become websites; caller-supplied images win over scraped ones
    pub fn for_individuals(content: &str, supplied: &[ImageRef]) -> Self {
        let (images, websites): (Vec<String>, Vec<String>) =
            find_urls(content).into_iter().partition(|url| is_image_url(url));

        let supplied: Vec<String> = supplied
            .iter()
            .map(|image| image.url.trim())
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect();

        let images = if supplied.is_empty() {
            images.into_iter().take(SCRAPED_IMAGE_LIMIT).collect()
        } else {
            supplied
        };

        Self {
            websites: websites
                .into_iter()
                .take(INDIVIDUAL_WEBSITE_LIMIT)
                .collect(),
            images,
        }
    }

    pub fn website(&self, index: usize) -> Option<&str> {
        self.websites.get(index).map(String::as_str)
    }

    pub fn image(&self, index: usize) -> Option<&str> {
        self.images.get(index).map(String::as_str)
    }
}

/// All links in `text`, in order of appearance
pub fn find_urls(text: &str) -> Vec<String> {
    URL.find_iter(text)
        .map(|m| clean_url(m.as_str()))
        .filter(|url| !url.is_empty())
        .collect()
}

/// First link in `text`
pub fn first_url(text: &str) -> Option<String> {
    URL.find_iter(text)
        .map(|m| clean_url(m.as_str()))
        .find(|url| !url.is_empty())
}

/// Whether the link path ends in a known image extension
pub fn is_image_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Drop prose and markdown punctuation glued to the end of a link
fn clean_url(raw: &str) -> String {
    let mut url = raw.trim_end_matches(TRAILING_PUNCTUATION);

    // Keep a closing paren/bracket only when the link itself opened one
    while let Some(close) = url.chars().last() {
        let open = match close {
            ')' => '(',
            ']' => '[',
            _ => break,
        };
        if url.matches(open).count() >= url.matches(close).count() {
            break;
        }
        url = url[..url.len() - 1].trim_end_matches(TRAILING_PUNCTUATION);
    }

    match url.split_once("://") {
        Some((_, rest)) if !rest.is_empty() => url.to_string(),
        _ => String::new(),
    }
}
