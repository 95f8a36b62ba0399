//! Quote record.

use super::{check_link, require_text, ValidationError};
use crate::similarity::{Candidate, CandidateText};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type QuoteId = Uuid;

/// Stored quote with attribution and subject tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: QuoteId,
    pub author: String,
    pub quote_text: String,
    /// Normalized subject tags in display order.
    pub subjects: Vec<String>,
    pub author_link: Option<String>,
    pub video_link: Option<String>,
    pub contributed_by: Option<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

impl Quote {
    /// Creates a quote with a fresh id; timestamps are assigned on insert.
    pub fn new(author: impl Into<String>, quote_text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author: author.into(),
            quote_text: quote_text.into(),
            subjects: Vec::new(),
            author_link: None,
            video_link: None,
            contributed_by: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Checks required fields and link shapes.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("quote_text", &self.quote_text)?;
        require_text("author", &self.author)?;
        check_link("author_link", self.author_link.as_deref())?;
        check_link("video_link", self.video_link.as_deref())?;
        Ok(())
    }

    /// Owned matcher view of this quote.
    pub fn to_candidate(&self) -> Candidate {
        Candidate::new(self.id.to_string(), &self.quote_text, &self.author)
    }
}

impl CandidateText for Quote {
    fn candidate_text(&self) -> &str {
        &self.quote_text
    }
}

/// Caller input for adding a quote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewQuote {
    pub author: String,
    pub quote_text: String,
    pub subjects: Vec<String>,
    pub author_link: Option<String>,
    pub video_link: Option<String>,
    pub contributed_by: Option<String>,
}

impl NewQuote {
    pub fn new(author: impl Into<String>, quote_text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            quote_text: quote_text.into(),
            ..Self::default()
        }
    }

    /// Builds the record to persist; text fields are trimmed and blank
    /// optional fields become `None`.
    pub fn into_quote(self) -> Quote {
        let mut quote = Quote::new(self.author.trim(), self.quote_text.trim());
        quote.subjects = super::subject::normalize_subjects(&self.subjects);
        quote.author_link = non_blank(self.author_link);
        quote.video_link = non_blank(self.video_link);
        quote.contributed_by = non_blank(self.contributed_by);
        quote
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
