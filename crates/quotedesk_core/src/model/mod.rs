//! Domain model for quotes, authors and subject groupings.
//!
//! # Responsibility
//! - Define the records the repositories persist and services return.
//! - Own field-level validation and subject normalization rules.
//!
//! # Invariants
//! - Every quote/author/super-subject has a stable UUID identity.
//! - Subjects are stored trimmed, lowercase and deduplicated.

pub mod author;
pub mod quote;
pub mod subject;
pub mod super_subject;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field-level validation failure for any domain record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty after trimming.
    BlankField(&'static str),
    /// Link field is present but not an http(s) URL.
    InvalidLink { field: &'static str, value: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "`{field}` must not be blank"),
            Self::InvalidLink { field, value } => {
                write!(f, "`{field}` must be an http(s) URL, got `{value}`")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}

pub(crate) fn check_link(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(link) if !(link.starts_with("http://") || link.starts_with("https://")) => {
            Err(ValidationError::InvalidLink {
                field,
                value: link.to_string(),
            })
        }
        _ => Ok(()),
    }
}
