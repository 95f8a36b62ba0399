//! Quote use-case service.
//!
//! # Responsibility
//! - Guard quote creation with the duplicate policy.
//! - Provide list/update/delete and subject maintenance entry points.
//!
//! # Invariants
//! - An `Identical` verdict always blocks creation.
//! - A `Similar` verdict never blocks; it is returned to the caller as a
//!   warning alongside the created quote.
//! - Quote bodies are never logged, only ids and scores.

use crate::model::quote::{NewQuote, Quote, QuoteId};
use crate::model::subject::{normalize_subjects, split_legacy_subjects};
use crate::model::ValidationError;
use crate::repo::quote_repo::{
    normalize_quote_limit, QuoteListQuery, QuoteRepository, QuoteSortKey, SortDirection,
    SubjectCount,
};
use crate::repo::{RepoError, RepoResult};
use crate::similarity::{Candidate, DuplicatePolicy, DuplicateVerdict};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for quote use-cases.
#[derive(Debug)]
pub enum QuoteServiceError {
    /// Input failed field validation.
    InvalidInput(ValidationError),
    /// An existing quote scored at or above the identical threshold.
    IdenticalQuote { existing_id: String, similarity: f64 },
    QuoteNotFound(QuoteId),
    Repo(RepoError),
    /// Write succeeded but read-back did not find the record.
    InconsistentState(&'static str),
}

impl Display for QuoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "invalid quote: {err}"),
            Self::IdenticalQuote {
                existing_id,
                similarity,
            } => write!(
                f,
                "identical quote already exists: {existing_id} (similarity {similarity:.3})"
            ),
            Self::QuoteNotFound(id) => write!(f, "quote not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent quote state: {details}"),
        }
    }
}

impl Error for QuoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for QuoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::QuoteNotFound(id),
            RepoError::Validation(err) => Self::InvalidInput(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for QuoteServiceError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

/// Owned copy of a matched stored quote.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateMatch {
    pub candidate: Candidate,
    pub similarity: f64,
}

/// Owned duplicate verdict returned across the service boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum DuplicateStatus {
    Unique,
    Similar(DuplicateMatch),
    Identical(DuplicateMatch),
}

impl DuplicateStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unique => "unique",
            Self::Similar(_) => "similar",
            Self::Identical(_) => "identical",
        }
    }

    pub fn matched(&self) -> Option<&DuplicateMatch> {
        match self {
            Self::Unique => None,
            Self::Similar(found) | Self::Identical(found) => Some(found),
        }
    }
}

impl From<DuplicateVerdict<'_, Candidate>> for DuplicateStatus {
    fn from(verdict: DuplicateVerdict<'_, Candidate>) -> Self {
        let own = |similarity: f64, candidate: &Candidate| DuplicateMatch {
            candidate: candidate.clone(),
            similarity,
        };
        match verdict {
            DuplicateVerdict::Unique => Self::Unique,
            DuplicateVerdict::Similar(found) => {
                Self::Similar(own(found.similarity, found.candidate))
            }
            DuplicateVerdict::Identical(found) => {
                Self::Identical(own(found.similarity, found.candidate))
            }
        }
    }
}

/// Result of a successful `add_quote`.
#[derive(Debug, Clone, PartialEq)]
pub struct AddQuoteOutcome {
    pub quote: Quote,
    /// `Unique` or `Similar`; identical input is rejected instead.
    pub verdict: DuplicateStatus,
}

/// Paged list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotesPage {
    pub items: Vec<Quote>,
    /// Effective normalized limit used by the query.
    pub applied_limit: u32,
}

/// Result of a bulk import.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub created: Vec<QuoteId>,
    /// `(input index, id of the identical stored or earlier-imported quote)`.
    pub skipped_identical: Vec<(usize, String)>,
}

/// Quote service facade over a repository implementation.
pub struct QuoteService<R: QuoteRepository> {
    repo: R,
    policy: DuplicatePolicy,
}

impl<R: QuoteRepository> QuoteService<R> {
    pub fn new(repo: R, policy: DuplicatePolicy) -> Self {
        Self { repo, policy }
    }

    pub fn policy(&self) -> &DuplicatePolicy {
        &self.policy
    }

    /// Classifies `text` against every stored quote.
    pub fn check_duplicate(&self, text: &str) -> RepoResult<DuplicateStatus> {
        let candidates = self.repo.list_candidates()?;
        let status = DuplicateStatus::from(self.policy.classify(text, &candidates));
        info!(
            "event=duplicate_check module=service status=ok verdict={} candidates={} similarity={:.3}",
            status.label(),
            candidates.len(),
            status.matched().map_or(0.0, |found| found.similarity)
        );
        Ok(status)
    }

    /// Validates, duplicate-checks and stores one quote.
    ///
    /// # Errors
    /// - `InvalidInput` for blank text/author or malformed links.
    /// - `IdenticalQuote` when a stored quote reaches the identical threshold.
    pub fn add_quote(&mut self, input: NewQuote) -> Result<AddQuoteOutcome, QuoteServiceError> {
        let quote = input.into_quote();
        quote.validate()?;

        let verdict = self.check_duplicate(&quote.quote_text)?;
        if let DuplicateStatus::Identical(found) = &verdict {
            warn!(
                "event=quote_add module=service status=rejected reason=identical existing_id={} similarity={:.3}",
                found.candidate.id, found.similarity
            );
            return Err(QuoteServiceError::IdenticalQuote {
                existing_id: found.candidate.id.clone(),
                similarity: found.similarity,
            });
        }

        let id = self.repo.create_quote(&quote)?;
        let stored = self
            .repo
            .get_quote(id)?
            .ok_or(QuoteServiceError::InconsistentState(
                "created quote not found in read-back",
            ))?;
        info!(
            "event=quote_add module=service status=ok quote_id={} verdict={}",
            id,
            verdict.label()
        );
        Ok(AddQuoteOutcome {
            quote: stored,
            verdict,
        })
    }

    /// Stores many quotes in one transaction, skipping inputs identical to a
    /// stored quote or to an earlier input of the same batch.
    pub fn import_quotes(
        &mut self,
        inputs: Vec<NewQuote>,
    ) -> Result<ImportReport, QuoteServiceError> {
        let mut candidates = self.repo.list_candidates()?;
        let mut accepted = Vec::new();
        let mut report = ImportReport::default();

        for (index, input) in inputs.into_iter().enumerate() {
            let quote = input.into_quote();
            quote.validate()?;
            if let DuplicateVerdict::Identical(found) =
                self.policy.classify(&quote.quote_text, &candidates)
            {
                report
                    .skipped_identical
                    .push((index, found.candidate.id.clone()));
                continue;
            }
            candidates.push(quote.to_candidate());
            accepted.push(quote);
        }

        report.created = self.repo.create_quotes(&accepted)?;
        info!(
            "event=quote_import module=service status=ok created={} skipped={}",
            report.created.len(),
            report.skipped_identical.len()
        );
        Ok(report)
    }

    pub fn get_quote(&self, id: QuoteId) -> RepoResult<Option<Quote>> {
        self.repo.get_quote(id)
    }

    /// Replaces a stored quote's fields; subjects are re-normalized.
    pub fn update_quote(&mut self, mut quote: Quote) -> Result<Quote, QuoteServiceError> {
        quote.subjects = normalize_subjects(&quote.subjects);
        quote.validate()?;
        self.repo.update_quote(&quote)?;
        self.repo
            .get_quote(quote.id)?
            .ok_or(QuoteServiceError::InconsistentState(
                "updated quote not found in read-back",
            ))
    }

    pub fn delete_quote(&self, id: QuoteId) -> Result<(), QuoteServiceError> {
        self.repo.delete_quote(id)?;
        info!("event=quote_delete module=service status=ok quote_id={id}");
        Ok(())
    }

    /// Lists quotes with optional author/subject filters.
    pub fn list_quotes(&self, mut query: QuoteListQuery) -> RepoResult<QuotesPage> {
        let applied_limit = normalize_quote_limit(query.limit);
        query.limit = Some(applied_limit);
        let items = self.repo.list_quotes(&query)?;
        Ok(QuotesPage {
            items,
            applied_limit,
        })
    }

    pub fn subject_counts(&self) -> RepoResult<Vec<SubjectCount>> {
        self.repo.subject_counts()
    }

    pub fn rename_subject(&mut self, from: &str, to: &str) -> RepoResult<u32> {
        let affected = self.repo.rename_subject(from, to)?;
        info!("event=subject_rename module=service status=ok affected={affected}");
        Ok(affected)
    }

    pub fn remove_subject(&mut self, subject: &str) -> RepoResult<u32> {
        let affected = self.repo.remove_subject(subject)?;
        info!("event=subject_remove module=service status=ok affected={affected}");
        Ok(affected)
    }

    /// Splits legacy single-entry subject lists (`["a, b, c"]`) into separate
    /// subjects. Returns the number of quotes rewritten.
    pub fn cleanup_legacy_subjects(&mut self) -> RepoResult<u32> {
        let legacy = self.collect_all_quotes()?.into_iter().filter_map(|mut quote| {
            split_legacy_subjects(&quote.subjects).map(|subjects| {
                quote.subjects = subjects;
                quote
            })
        });

        let mut rewritten = 0u32;
        for quote in legacy.collect::<Vec<_>>() {
            self.repo.update_quote(&quote)?;
            rewritten += 1;
        }
        info!("event=subject_cleanup module=service status=ok rewritten={rewritten}");
        Ok(rewritten)
    }

    /// Every stored quote, oldest first, read page by page.
    pub fn collect_all_quotes(&self) -> RepoResult<Vec<Quote>> {
        let page_size = normalize_quote_limit(Some(u32::MAX));
        let mut all = Vec::new();
        let mut offset = 0u32;
        loop {
            let page = self.repo.list_quotes(&QuoteListQuery {
                sort: QuoteSortKey::CreatedAt,
                direction: SortDirection::Ascending,
                limit: Some(page_size),
                offset,
                ..QuoteListQuery::default()
            })?;
            let fetched = page.len() as u32;
            all.extend(page);
            if fetched < page_size {
                return Ok(all);
            }
            offset += fetched;
        }
    }
}
