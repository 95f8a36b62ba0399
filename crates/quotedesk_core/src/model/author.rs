//! Author profile record.

use super::{check_link, require_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type AuthorId = Uuid;

/// Author profile shown next to quotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: AuthorId,
    /// Display name; quotes reference authors by this exact trimmed value.
    pub name: String,
    /// Photo URL.
    pub profile_url: Option<String>,
    /// Short biography.
    pub description: Option<String>,
    pub amazon_page: Option<String>,
    pub amazon_affiliate: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            profile_url: None,
            description: None,
            amazon_page: None,
            amazon_affiliate: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        check_link("profile_url", self.profile_url.as_deref())?;
        check_link("amazon_page", self.amazon_page.as_deref())?;
        Ok(())
    }

    /// Whether both biography and photo are already filled in.
    pub fn is_profile_complete(&self) -> bool {
        has_text(self.description.as_deref()) && has_text(self.profile_url.as_deref())
    }
}

fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::Author;

    #[test]
    fn new_trims_name_and_starts_incomplete() {
        let author = Author::new("  Grace Hopper ");
        assert_eq!(author.name, "Grace Hopper");
        assert!(!author.is_profile_complete());
        assert!(author.validate().is_ok());
    }

    #[test]
    fn blank_description_does_not_count_as_complete() {
        let mut author = Author::new("Grace Hopper");
        author.profile_url = Some("https://img.example/grace.jpg".to_string());
        author.description = Some("  ".to_string());
        assert!(!author.is_profile_complete());
        author.description = Some("Computer scientist.".to_string());
        assert!(author.is_profile_complete());
    }
}
