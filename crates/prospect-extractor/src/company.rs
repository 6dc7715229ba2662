//! Company records

use once_cell::sync::Lazy;
use prospect_core::{CompanyQuery, CompanyRecord, ImageRef};
use regex::Regex;
use serde_json::{Map, Value};

use crate::harvest::{first_url, Harvest};
use crate::lines::{first_capture, is_ordinal, mentions};
use crate::structured::aliased_field;
use crate::RecordKind;

// ============================================================================
// Field aliases for structured blocks
// ============================================================================

const NAME_ALIASES: &[&str] = &["company_name", "name"];
const REGISTRATION_ALIASES: &[&str] = &[
    "company_registration_number",
    "registration_number",
    "reg_number",
];
const COUNTRY_ALIASES: &[&str] = &["country", "location"];
const INDUSTRY_ALIASES: &[&str] = &["industry", "sector"];
const WEBSITE_ALIASES: &[&str] = &["website_url", "website", "url"];
const SOURCE_ALIASES: &[&str] = &["source_url", "source"];

// ============================================================================
// Line patterns
// ============================================================================

fn regex(source: &str) -> Regex {
    Regex::new(source).expect("valid company pattern")
}

static NAME: Lazy<Regex> = Lazy::new(|| regex(r"(?i)name:\s*(.+)"));
static COMPANY: Lazy<Regex> = Lazy::new(|| regex(r"(?i)company:\s*(.+)"));
static ORDINAL_NAME: Lazy<Regex> = Lazy::new(|| regex(r"^\d+\.\s*(.+)"));

/// `Registration Number: HRB 1234`, `Reg. No.: 1234`, `Registered #: 1234`
static REGISTRATION_LABELLED: Lazy<Regex> = Lazy::new(|| {
    regex(r"(?i)\b(?:registration|registered|reg\.?)\s*(?:number|no\.?|#|id)?\s*[:#]\s*(.+)")
});
/// `... under registration number 1234 ...`
static REGISTRATION_INLINE: Lazy<Regex> = Lazy::new(|| {
    regex(r"(?i)\bregistration\s+(?:number|no\.?)\s+(?:is\s+)?([A-Z0-9][A-Z0-9-]*)")
});
/// `Company number 01234567`
static COMPANY_NUMBER: Lazy<Regex> =
    Lazy::new(|| regex(r"(?i)\bcompany\s+(?:number|no\.?)\s*[:#]?\s*([A-Z0-9][A-Z0-9-]*)"));

static COUNTRY: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bcountry\b[^:\n]*:\s*(.+)"));
static LOCATION: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\blocation:\s*(.+)"));
static HEADQUARTERS: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bheadquarters:\s*(.+)"));

static INDUSTRY: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bindustry:\s*(.+)"));
static SECTOR: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bsector:\s*(.+)"));

/// Marker for company records
#[derive(Debug, Clone, Copy, Default)]
pub struct Company;

impl RecordKind for Company {
    type Query = CompanyQuery;
    type Record = CompanyRecord;

    const KIND: &'static str = "company";

    fn from_object(
        object: &Map<String, Value>,
        _index: usize,
        _images: &[ImageRef],
    ) -> CompanyRecord {
        CompanyRecord {
            company_name: aliased_field(object, NAME_ALIASES),
            company_registration_number: aliased_field(object, REGISTRATION_ALIASES),
            country: aliased_field(object, COUNTRY_ALIASES),
            industry: aliased_field(object, INDUSTRY_ALIASES),
            website_url: aliased_field(object, WEBSITE_ALIASES),
            source_url: aliased_field(object, SOURCE_ALIASES),
        }
    }

    fn harvest(content: &str, _images: &[ImageRef]) -> Harvest {
        Harvest::for_companies(content)
    }

    fn opens_record(line: &str) -> bool {
        mentions(line, "name:") || mentions(line, "company:") || is_ordinal(line)
    }

    fn open_record(line: &str) -> CompanyRecord {
        CompanyRecord {
            company_name: first_capture(line, &[&NAME, &COMPANY, &ORDINAL_NAME])
                .unwrap_or_default(),
            ..Default::default()
        }
    }

    fn read_detail(line: &str, record: &mut CompanyRecord) {
        if let Some(number) = first_capture(
            line,
            &[&REGISTRATION_LABELLED, &REGISTRATION_INLINE, &COMPANY_NUMBER],
        ) {
            record.company_registration_number = number;
        }

        if let Some(country) = first_capture(line, &[&COUNTRY, &LOCATION, &HEADQUARTERS]) {
            record.country = country;
        }

        if let Some(industry) = first_capture(line, &[&INDUSTRY, &SECTOR]) {
            record.industry = industry;
        }

        if let Some(url) = first_url(line) {
            if mentions(line, "website") {
                record.website_url = url;
            } else if mentions(line, "source") {
                record.source_url = url;
            } else if record.website_url.is_empty() {
                record.website_url = url;
            }
        }
    }

    fn is_eligible(record: &CompanyRecord) -> bool {
        record.has_name()
            && [
                &record.company_registration_number,
                &record.country,
                &record.industry,
                &record.website_url,
                &record.source_url,
            ]
            .iter()
            .any(|field| !field.is_empty())
    }

    fn assign_harvested(record: &mut CompanyRecord, index: usize, harvest: &Harvest) {
        if record.website_url.is_empty() && record.source_url.is_empty() {
            if let Some(url) = harvest.website(index) {
                record.website_url = url.to_string();
            }
        }
    }

    fn fallback(query: &CompanyQuery, harvest: &Harvest) -> CompanyRecord {
        CompanyRecord {
            company_name: query.company_name.trim().to_string(),
            company_registration_number: echo(&query.company_registration_number),
            country: echo(&query.country),
            industry: echo(&query.industry),
            website_url: harvest.website(0).unwrap_or_default().to_string(),
            source_url: harvest.website(1).unwrap_or_default().to_string(),
        }
    }
}

fn echo(field: &Option<String>) -> String {
    field.as_deref().unwrap_or_default().trim().to_string()
}

#[cfg(test)]
mod tests {
    use crate::{extract, extract_companies, Company, Tier};
    use prospect_core::{CompanyQuery, CompanyRecord};

    fn query() -> CompanyQuery {
        CompanyQuery::new("Acme")
    }

    #[test]
    fn test_fenced_array_with_aliases() {
        let content = r#"Here are the matches:
```json
[
  {"name": "Acme Corp", "registration_number": "HRB 1234", "location": "Germany", "sector": "Manufacturing", "website": "https://acme.de"},
  {"company_name": "Acme Ltd", "reg_number": 998877, "country": "UK", "source": "https://find-and-update.company-information.service.gov.uk/company/998877"}
]
```"#;
        let records = extract_companies(content, &query());

        assert_eq!(
            records,
            vec![
                CompanyRecord {
                    company_name: "Acme Corp".to_string(),
                    company_registration_number: "HRB 1234".to_string(),
                    country: "Germany".to_string(),
                    industry: "Manufacturing".to_string(),
                    website_url: "https://acme.de".to_string(),
                    source_url: String::new(),
                },
                CompanyRecord {
                    company_name: "Acme Ltd".to_string(),
                    company_registration_number: "998877".to_string(),
                    country: "UK".to_string(),
                    industry: String::new(),
                    website_url: String::new(),
                    source_url:
                        "https://find-and-update.company-information.service.gov.uk/company/998877"
                            .to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_single_object_is_wrapped() {
        let content = r#"{"company_name": "Acme", "industry": "Retail"}"#;
        let records = extract_companies(content, &query());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].industry, "Retail");
        assert_eq!(records[0].country, "");
    }

    #[test]
    fn test_markdown_listing() {
        let content = "\
I found the following companies:

1. **Acme Holdings Ltd**
   - Registration Number: 01234567
   - Country: United Kingdom
   - Industry: Financial services
   - Website: https://acmeholdings.co.uk
   - Source: https://find-and-update.company-information.service.gov.uk/company/01234567

2. **Acme Inc.**
   - Location: Delaware, USA
   - Sector: Software
";
        let extraction = extract::<Company>(content, &query(), &[]);
        assert_eq!(extraction.tier, Tier::LineHeuristic);

        let records = extraction.records;
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].company_name, "Acme Holdings Ltd");
        assert_eq!(records[0].company_registration_number, "01234567");
        assert_eq!(records[0].country, "United Kingdom");
        assert_eq!(records[0].industry, "Financial services");
        assert_eq!(records[0].website_url, "https://acmeholdings.co.uk");
        assert_eq!(
            records[0].source_url,
            "https://find-and-update.company-information.service.gov.uk/company/01234567"
        );

        assert_eq!(records[1].company_name, "Acme Inc.");
        assert_eq!(records[1].country, "Delaware, USA");
        assert_eq!(records[1].industry, "Software");
        // Second harvested link fills the gap positionally
        assert_eq!(
            records[1].website_url,
            "https://find-and-update.company-information.service.gov.uk/company/01234567"
        );
    }

    #[test]
    fn test_labelled_name_lines() {
        let content = "Company: Globex\nCountry: US\nName: Initech\nIndustry: Software";
        let records = extract_companies(content, &query());

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].company_name, "Globex");
        assert_eq!(records[0].country, "US");
        assert_eq!(records[1].company_name, "Initech");
        assert_eq!(records[1].industry, "Software");
    }

    #[test]
    fn test_registration_variants() {
        let content = "\
1. Alpha
Reg. No.: A-100
2. Beta
Registered under registration number 55512 in Ohio.
3. Gamma
Company number 07654321
4. Delta
Registered office: 1 Main Street
Region: EMEA
";
        let records = extract_companies(content, &query());

        let numbers: Vec<&str> = records
            .iter()
            .map(|r| r.company_registration_number.as_str())
            .collect();
        assert_eq!(numbers, vec!["A-100", "55512", "07654321"]);
        // Delta has no usable detail and is dropped
        assert!(records.iter().all(|r| r.company_name != "Delta"));
    }

    #[test]
    fn test_name_only_entries_fall_back_to_query() {
        let content = "Sources: https://acme.example.com and https://registry.example.org\n\
                       1. Acme One\n\
                       2. Acme Two";
        let query = CompanyQuery::new("Acme")
            .with_country("France")
            .with_industry("Chemicals");
        let records = extract_companies(content, &query);

        assert_eq!(
            records,
            vec![CompanyRecord {
                company_name: "Acme".to_string(),
                company_registration_number: String::new(),
                country: "France".to_string(),
                industry: "Chemicals".to_string(),
                website_url: "https://acme.example.com".to_string(),
                source_url: "https://registry.example.org".to_string(),
            }]
        );
    }

    #[test]
    fn test_unlabelled_url_only_fills_empty_website() {
        let content = "\
Name: Acme
Website: https://acme.com
Profile https://news.example.com/acme
";
        let records = extract_companies(content, &query());

        assert_eq!(records[0].website_url, "https://acme.com");
        assert_eq!(records[0].source_url, "");
    }

    #[test]
    fn test_fallback_trims_echoed_fields() {
        let query = CompanyQuery::new(" Acme ")
            .with_registration_number("01234567 ")
            .with_country(" France ")
            .with_industry("\tRetail");
        let records = extract_companies("Nothing conclusive.", &query);

        assert_eq!(
            records,
            vec![CompanyRecord {
                company_name: "Acme".to_string(),
                company_registration_number: "01234567".to_string(),
                country: "France".to_string(),
                industry: "Retail".to_string(),
                ..Default::default()
            }]
        );
    }
}
