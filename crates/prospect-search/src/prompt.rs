//! Upstream prompts for company and individual searches

use prospect_core::{CompanyQuery, IndividualQuery};

/// System message plus user prompt for one search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPrompt {
    pub system: String,
    pub user: String,
}

/// Builder for search prompts
///
/// Instructions are joined with single spaces, then the `Search for:` line is
/// appended with one `, <clause>` per known query detail.
#[derive(Debug, Default)]
pub struct PromptBuilder {
    system: Vec<String>,
    instructions: Vec<String>,
    subject: String,
    clauses: Vec<String>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sentence to the system message
    pub fn system(mut self, sentence: impl Into<String>) -> Self {
        self.system.push(sentence.into());
        self
    }

    /// Add a sentence to the user prompt preamble
    pub fn instruction(mut self, sentence: impl Into<String>) -> Self {
        self.instructions.push(sentence.into());
        self
    }

    /// Set the searched name
    pub fn search_for(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Append `, <prefix> <value>` when the value is present and non-blank
    pub fn clause(mut self, prefix: &str, value: Option<&str>, suffix: &str) -> Self {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.clauses.push(format!("{prefix}{value}{suffix}"));
        }
        self
    }

    pub fn build(self) -> SearchPrompt {
        let mut user = self.instructions.join(" ");
        user.push_str("\n\nSearch for: ");
        user.push_str(self.subject.trim());
        for clause in &self.clauses {
            user.push_str(", ");
            user.push_str(clause);
        }

        SearchPrompt {
            system: self.system.join(" "),
            user,
        }
    }
}

/// Prompt asking for up to five distinct real companies
pub fn company_prompt(query: &CompanyQuery) -> SearchPrompt {
    PromptBuilder::new()
        .system("You are an AI assistant that provides factual information about real companies based on web searches.")
        .system("Never generate fictional company profiles.")
        .system("Always compile distinct companies - don't list the same company multiple times.")
        .system("Simply state \"No information available\" when you cannot find real information about a company.")
        .system("Return results in JSON format with fields: company_name, company_registration_number, country, industry, website_url, and source_url.")
        .instruction("Return ONLY real company profiles found on the web, structured as a JSON array with company_name, company_registration_number, country, industry, website_url, and source_url fields.")
        .instruction("IMPORTANT: Compile DISTINCT companies - do not include the same company multiple times, instead combine information from different sources about the same company.")
        .instruction("If multiple different companies match this name, provide up to 5 distinct companies.")
        .instruction("Do not invent or fabricate data.")
        .search_for(&query.company_name)
        .clause(
            "registration number ",
            query.company_registration_number.as_deref(),
            "",
        )
        .clause("from ", query.country.as_deref(), "")
        .clause("in the ", query.industry.as_deref(), " industry")
        .build()
}

/// Prompt asking for up to five distinct real people
pub fn individual_prompt(query: &IndividualQuery) -> SearchPrompt {
    PromptBuilder::new()
        .system("You are an AI assistant that provides factual information about real individuals based on web searches.")
        .system("Never generate fictional individual profiles.")
        .system("Always compile distinct individuals - don't list the same person multiple times.")
        .system("Simply state \"No information available\" when you cannot find real information about a person.")
        .system("Return results in JSON format with fields: first_name, last_name, birth_date, country, profile_image_url, and source_url.")
        .system("For dates, use ISO format (YYYY-MM-DD) when possible.")
        .system("For profile_image_url, include direct links to real images of the person when available.")
        .instruction("Return ONLY real individual profiles found on the web as a JSON array with first_name, last_name, birth_date, country, profile_image_url, and source_url fields.")
        .instruction("IMPORTANT: Compile DISTINCT individuals - do not include the same person multiple times, instead combine information from different sources about the same person.")
        .instruction("If multiple different people match this name, provide up to 5 distinct individuals.")
        .instruction("Do not invent or fabricate data.")
        .search_for(&query.name)
        .clause("born ", query.birth_date.as_deref(), "")
        .clause("from ", query.country.as_deref(), "")
        .build()
}
