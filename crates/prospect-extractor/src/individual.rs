//! Individual records

use once_cell::sync::Lazy;
use prospect_core::{split_full_name, ImageRef, IndividualQuery, IndividualRecord};
use regex::Regex;
use serde_json::{Map, Value};

use crate::harvest::{first_url, Harvest};
use crate::lines::{first_capture, is_ordinal, mentions};
use crate::structured::aliased_field;
use crate::RecordKind;

const FIRST_NAME_ALIASES: &[&str] = &["first_name"];
const LAST_NAME_ALIASES: &[&str] = &["last_name"];
const BIRTH_DATE_ALIASES: &[&str] = &["birth_date", "dob"];
const COUNTRY_ALIASES: &[&str] = &["country", "nationality"];
const IMAGE_ALIASES: &[&str] = &["profile_image_url", "image_url", "photo_url"];
const SOURCE_ALIASES: &[&str] = &["source_url", "url", "link"];

fn regex(source: &str) -> Regex {
    Regex::new(source).expect("valid individual pattern")
}

static NAME: Lazy<Regex> = Lazy::new(|| regex(r"(?i)name:\s*(.+)"));
static ORDINAL_NAME: Lazy<Regex> = Lazy::new(|| regex(r"^\d+\.\s*(.+)"));

/// `14/07/1962`, `1962-07-14`, `July 14, 1962`, `14 July 1962`
static BIRTH_DATE: Lazy<Regex> = Lazy::new(|| {
    regex(
        r"\b(\d{1,2}/\d{1,2}/\d{2,4}|\d{4}-\d{2}-\d{2}|[A-Z][a-z]+\.?\s+\d{1,2},\s*\d{4}|\d{1,2}\s+[A-Z][a-z]+\s+\d{4})\b",
    )
});

static COUNTRY: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bcountry\b[^:\n]*:\s*(.+)"));
static NATIONALITY: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bnationality:\s*(.+)"));
static CITIZENSHIP: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bcitizenship:\s*(.+)"));

/// Marker for individual records
#[derive(Debug, Clone, Copy, Default)]
pub struct Individual;

impl RecordKind for Individual {
    type Query = IndividualQuery;
    type Record = IndividualRecord;

    const KIND: &'static str = "individual";

    fn from_object(
        object: &Map<String, Value>,
        index: usize,
        images: &[ImageRef],
    ) -> IndividualRecord {
        let mut profile_image_url = aliased_field(object, IMAGE_ALIASES);
        if profile_image_url.is_empty() {
            if let Some(image) = images.get(index) {
                profile_image_url = image.url.trim().to_string();
            }
        }

        IndividualRecord {
            first_name: aliased_field(object, FIRST_NAME_ALIASES),
            last_name: aliased_field(object, LAST_NAME_ALIASES),
            birth_date: aliased_field(object, BIRTH_DATE_ALIASES),
            country: aliased_field(object, COUNTRY_ALIASES),
            profile_image_url,
            source_url: aliased_field(object, SOURCE_ALIASES),
        }
    }

    fn harvest(content: &str, images: &[ImageRef]) -> Harvest {
        Harvest::for_individuals(content, images)
    }

    fn opens_record(line: &str) -> bool {
        mentions(line, "name:") || is_ordinal(line)
    }

    fn open_record(line: &str) -> IndividualRecord {
        let full_name = first_capture(line, &[&NAME, &ORDINAL_NAME]).unwrap_or_default();
        let (first_name, last_name) = split_full_name(&full_name);
        IndividualRecord {
            first_name,
            last_name,
            ..Default::default()
        }
    }

    fn read_detail(line: &str, record: &mut IndividualRecord) {
        if mentions(line, "birth") || mentions(line, "born") {
            if let Some(date) = first_capture(line, &[&BIRTH_DATE]) {
                record.birth_date = date;
            }
        }

        if let Some(country) = first_capture(line, &[&COUNTRY, &NATIONALITY, &CITIZENSHIP]) {
            record.country = country;
        }

        if let Some(url) = first_url(line) {
            record.source_url = url;
        }
    }

    fn is_eligible(record: &IndividualRecord) -> bool {
        record.has_name()
            && [
                &record.birth_date,
                &record.country,
                &record.profile_image_url,
                &record.source_url,
            ]
            .iter()
            .any(|field| !field.is_empty())
    }

    fn assign_harvested(record: &mut IndividualRecord, index: usize, harvest: &Harvest) {
        if record.profile_image_url.is_empty() {
            if let Some(url) = harvest.image(index) {
                record.profile_image_url = url.to_string();
            }
        }
        if record.source_url.is_empty() {
            if let Some(url) = harvest.website(index) {
                record.source_url = url.to_string();
            }
        }
    }

    fn fallback(query: &IndividualQuery, harvest: &Harvest) -> IndividualRecord {
        let (first_name, last_name) = split_full_name(&query.name);
        IndividualRecord {
            first_name,
            last_name,
            birth_date: echo(&query.birth_date),
            country: echo(&query.country),
            profile_image_url: harvest.image(0).unwrap_or_default().to_string(),
            source_url: harvest.website(0).unwrap_or_default().to_string(),
        }
    }
}

fn echo(field: &Option<String>) -> String {
    field.as_deref().unwrap_or_default().trim().to_string()
}

#[cfg(test)]
mod tests {
    use crate::{extract, extract_individuals, Individual, Tier};
    use prospect_core::{ImageRef, IndividualQuery, IndividualRecord};

    fn query() -> IndividualQuery {
        IndividualQuery::new("Jane Doe")
    }

    #[test]
    fn test_fenced_array_uses_upstream_images_by_position() {
        let content = r#"```json
[
  {"first_name": "Jane", "last_name": "Doe", "dob": "1980-03-05", "nationality": "France", "link": "https://example.fr/jane"},
  {"first_name": "Jane", "last_name": "Doe", "country": "Canada", "photo_url": "https://cdn.example.ca/jd.png"},
  {"first_name": "J.", "last_name": "Doe"}
]
```"#;
        let images = vec![
            ImageRef::new("https://images.example.com/0.jpg"),
            ImageRef::new("https://images.example.com/1.jpg"),
        ];
        let records = extract_individuals(content, &query(), &images);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].birth_date, "1980-03-05");
        assert_eq!(records[0].country, "France");
        assert_eq!(records[0].source_url, "https://example.fr/jane");
        assert_eq!(records[0].profile_image_url, "https://images.example.com/0.jpg");
        // Explicit photo wins over the positional image
        assert_eq!(records[1].profile_image_url, "https://cdn.example.ca/jd.png");
        // No image left for the third element
        assert_eq!(records[2].profile_image_url, "");
    }

    #[test]
    fn test_ordinal_name_with_country() {
        let records = extract_individuals("1. Jane Doe\nCountry: France", &query(), &[]);

        assert_eq!(
            records,
            vec![IndividualRecord {
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                country: "France".to_string(),
                ..Default::default()
            }]
        );
    }

    #[test]
    fn test_unstructured_text_falls_back_to_query() {
        let query = IndividualQuery::new("John Smith");
        let extraction = extract::<Individual>(
            "There are many people with this name and nothing conclusive.",
            &query,
            &[],
        );

        assert_eq!(extraction.tier, Tier::QueryFallback);
        assert_eq!(
            extraction.records,
            vec![IndividualRecord {
                first_name: "John".to_string(),
                last_name: "Smith".to_string(),
                ..Default::default()
            }]
        );
    }

    #[test]
    fn test_fallback_echoes_query_and_harvest() {
        let query = IndividualQuery::new("Mary Ann Smith")
            .with_birth_date("1975-01-02")
            .with_country("Ireland");
        let content = "Possibly https://news.example.ie/profile or \
                       https://photos.example.ie/mary.jpeg";
        let records = extract_individuals(content, &query, &[]);

        assert_eq!(
            records,
            vec![IndividualRecord {
                first_name: "Mary".to_string(),
                last_name: "Ann Smith".to_string(),
                birth_date: "1975-01-02".to_string(),
                country: "Ireland".to_string(),
                profile_image_url: "https://photos.example.ie/mary.jpeg".to_string(),
                source_url: "https://news.example.ie/profile".to_string(),
            }]
        );
    }

    #[test]
    fn test_birth_date_formats() {
        let content = "\
1. Ann One
Born: 14/07/1962
2. Ben Two
Date of birth: 1962-07-14
3. Cat Three
She was born on July 14, 1962 in Lyon.
4. Dan Four
Born 14 July 1962
5. Eve Five
Joined the board 2001-01-01
";
        let records = extract_individuals(content, &IndividualQuery::new("x"), &[]);

        let dates: Vec<&str> = records.iter().map(|r| r.birth_date.as_str()).collect();
        assert_eq!(dates, vec!["14/07/1962", "1962-07-14", "July 14, 1962", "14 July 1962"]);
    }

    #[test]
    fn test_markdown_profiles_with_positional_links() {
        let content = "\
### 1. **Jane Doe**
- **Nationality**: French
- **Date of Birth**: March 5, 1980
- Photo: https://cdn.example.com/jane.png

### 2. **Jane A. Doe**
- Citizenship: Belgian

Sources: https://example.com/a, https://example.com/b
";
        let extraction = extract::<Individual>(content, &query(), &[]);
        assert_eq!(extraction.tier, Tier::LineHeuristic);

        let records = extraction.records;
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].first_name, "Jane");
        assert_eq!(records[0].last_name, "Doe");
        assert_eq!(records[0].country, "French");
        assert_eq!(records[0].birth_date, "March 5, 1980");
        // Detail-line links are sources; the photo also arrives as harvested image 0
        assert_eq!(records[0].source_url, "https://cdn.example.com/jane.png");
        assert_eq!(records[0].profile_image_url, "https://cdn.example.com/jane.png");

        assert_eq!(records[1].last_name, "A. Doe");
        assert_eq!(records[1].country, "Belgian");
        // Only one image was harvested
        assert_eq!(records[1].profile_image_url, "");
        // The sources line belongs to the open record
        assert_eq!(records[1].source_url, "https://example.com/a");
    }

    #[test]
    fn test_supplied_images_fill_line_records() {
        let content = "Name: Jane Doe\nCountry: France\nhttps://cdn.example.com/scraped.png";
        let images = vec![ImageRef::new("https://upstream.example.com/jane.jpg")];
        let records = extract_individuals(content, &query(), &images);

        // The inline link is the source; supplied images replace the scraped one
        assert_eq!(records[0].source_url, "https://cdn.example.com/scraped.png");
        assert_eq!(records[0].profile_image_url, "https://upstream.example.com/jane.jpg");

        let content = "Name: Jane Doe\nCountry: France";
        let records = extract_individuals(content, &query(), &images);
        assert_eq!(records[0].profile_image_url, "https://upstream.example.com/jane.jpg");
    }

    #[test]
    fn test_detail_line_link_is_source() {
        let content = "1. Jane Doe\nCountry: France\nPhoto: https://cdn.example.com/jane.png";
        let records = extract_individuals(content, &query(), &[]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source_url, "https://cdn.example.com/jane.png");
    }

    #[test]
    fn test_fallback_trims_echoed_fields() {
        let query = IndividualQuery::new("  Jane Doe ")
            .with_birth_date(" 1980-03-05")
            .with_country(" France ");
        let records = extract_individuals("Nothing conclusive.", &query, &[]);

        assert_eq!(
            records,
            vec![IndividualRecord {
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                birth_date: "1980-03-05".to_string(),
                country: "France".to_string(),
                ..Default::default()
            }]
        );
    }
}
