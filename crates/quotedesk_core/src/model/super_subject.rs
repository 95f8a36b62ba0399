//! Super-subject grouping: a curated bundle of subjects and authors.

use super::{require_text, ValidationError};
use crate::model::subject::normalize_subjects;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SuperSubjectId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuperSubject {
    pub id: SuperSubjectId,
    pub name: String,
    pub subjects: Vec<String>,
    pub authors: Vec<String>,
    pub image: Option<String>,
    pub updated_at: i64,
}

impl SuperSubject {
    /// Builds a grouping with normalized subjects and trimmed author names.
    pub fn new(name: impl Into<String>, subjects: &[String], authors: &[String]) -> Self {
        let mut author_names: Vec<String> = Vec::new();
        for author in authors {
            let trimmed = author.trim();
            if !trimmed.is_empty() && !author_names.iter().any(|known| known == trimmed) {
                author_names.push(trimmed.to_string());
            }
        }

        Self {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            subjects: normalize_subjects(subjects),
            authors: author_names,
            image: None,
            updated_at: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)
    }
}

/// Default groupings used to seed an empty store.
pub fn default_super_subjects() -> Vec<SuperSubject> {
    const DEFAULTS: &[(&str, &[&str])] = &[
        (
            "Innovation & Visionaries",
            &["innovation", "creativity", "future", "technology", "change"],
        ),
        (
            "Startups & Building",
            &["startup", "business", "entrepreneur", "build", "process"],
        ),
        (
            "Leadership & Management",
            &["leadership", "management", "teamwork", "decision", "responsibility"],
        ),
        (
            "Resilience & Grit",
            &["failure", "perseverance", "courage", "grit", "overcome"],
        ),
        (
            "Focus & Productivity",
            &["focus", "efficiency", "habit", "time", "priority"],
        ),
        (
            "Mindset & Motivation",
            &["attitude", "motivation", "inspiration", "positivity", "mindset"],
        ),
    ];

    DEFAULTS
        .iter()
        .map(|(name, subjects)| {
            let subjects: Vec<String> = subjects.iter().map(|s| s.to_string()).collect();
            SuperSubject::new(*name, &subjects, &[])
        })
        .collect()
}
