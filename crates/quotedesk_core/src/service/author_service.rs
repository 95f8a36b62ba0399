//! Author use-case service.
//!
//! # Responsibility
//! - Keep the authors table in step with names used by quotes.
//! - Fill missing profile fields from a profile source chain.
//!
//! # Invariants
//! - Enrichment only fills empty fields; existing descriptions and photos
//!   are never overwritten.
//! - Source failures count as "no data" and never abort a run.
//! - Database reads and writes stay on the caller thread; only source
//!   lookups run on the worker pool.

use crate::enrich::{run_bounded, BatchFailure, BatchReport, PoolError, ProfileData, SourceChain};
use crate::model::author::{Author, AuthorId};
use crate::model::check_link;
use crate::repo::author_repo::AuthorRepository;
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Bulk enrichment failure that stops the whole run.
#[derive(Debug)]
pub enum AuthorServiceError {
    Repo(RepoError),
    Pool(PoolError),
}

impl Display for AuthorServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Pool(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthorServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Pool(err) => Some(err),
        }
    }
}

impl From<RepoError> for AuthorServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<PoolError> for AuthorServiceError {
    fn from(value: PoolError) -> Self {
        Self::Pool(value)
    }
}

/// What `ensure_author_profile` did for one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileOutcome {
    /// Blank name.
    Skipped,
    /// Description and photo were already present.
    AlreadyComplete,
    Created(Author),
    Updated(Author),
    /// Author exists but no source had anything new.
    Unchanged,
}

impl ProfileOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::AlreadyComplete => "complete",
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
            Self::Unchanged => "unchanged",
        }
    }
}

/// Author service facade over a repository implementation.
pub struct AuthorService<R: AuthorRepository> {
    repo: R,
}

impl<R: AuthorRepository> AuthorService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_author(&self, author: &Author) -> RepoResult<AuthorId> {
        self.repo.create_author(author)
    }

    pub fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        self.repo.get_author(id)
    }

    pub fn find_author(&self, name: &str) -> RepoResult<Option<Author>> {
        self.repo.find_author_by_name(name)
    }

    pub fn update_author(&self, author: &Author) -> RepoResult<()> {
        self.repo.update_author(author)
    }

    pub fn delete_author(&self, id: AuthorId) -> RepoResult<()> {
        self.repo.delete_author(id)
    }

    pub fn list_authors(&self) -> RepoResult<Vec<Author>> {
        self.repo.list_authors()
    }

    /// Creates a bare author row for every quote author not registered yet.
    ///
    /// # Contract
    /// - Names are compared after trimming.
    /// - Returns the number of authors created.
    pub fn populate_from_quotes(&self) -> RepoResult<u32> {
        let mut created = 0u32;
        for name in self.repo.list_unregistered_quote_authors()? {
            self.repo.create_author(&Author::new(name))?;
            created += 1;
        }
        info!("event=author_populate module=service status=ok created={created}");
        Ok(created)
    }

    /// Makes sure `name` has an author row and fills missing profile fields
    /// from `sources`.
    pub fn ensure_author_profile(
        &self,
        name: &str,
        sources: &SourceChain,
    ) -> RepoResult<ProfileOutcome> {
        let Some(pending) = self.pending_profile(name)? else {
            return Ok(if name.trim().is_empty() {
                ProfileOutcome::Skipped
            } else {
                ProfileOutcome::AlreadyComplete
            });
        };
        let data = sources.lookup(name.trim());
        self.store_profile(pending, data)
    }

    /// Runs `ensure_author_profile` for many names with lookups spread over
    /// `workers` threads.
    ///
    /// # Contract
    /// - Failure indexes refer to positions in `names`.
    /// - Blank, repeated or already complete names count as succeeded.
    /// - A name no source knows about is still registered like in
    ///   `ensure_author_profile`, but counts as a failure with message
    ///   `no profile data`.
    pub fn ensure_profiles_bulk(
        &self,
        names: &[String],
        sources: &SourceChain,
        workers: usize,
    ) -> Result<BatchReport, AuthorServiceError> {
        let mut report = BatchReport::default();
        let mut pending = Vec::new();
        let mut seen = HashSet::new();
        for (index, name) in names.iter().enumerate() {
            if !seen.insert(name.trim()) {
                report.succeeded += 1;
                continue;
            }
            match self.pending_profile(name)? {
                Some(author) => pending.push((index, author)),
                None => report.succeeded += 1,
            }
        }

        let lookups = run_bounded(&pending, workers, |(_, profile)| {
            sources
                .lookup(&profile.author.name)
                .ok_or_else(|| "no profile data".to_string())
        })?;

        for ((index, profile), outcome) in pending.into_iter().zip(lookups.outcomes) {
            let result = match outcome {
                Ok(data) => self
                    .store_profile(profile, Some(data))
                    .map_err(|err| err.to_string()),
                Err(message) => match self.store_profile(profile, None) {
                    Ok(_) => Err(message),
                    Err(err) => Err(err.to_string()),
                },
            };
            match result {
                Ok(_) => report.succeeded += 1,
                Err(message) => report.failed.push(BatchFailure { index, message }),
            }
        }

        info!(
            "event=author_enrich_bulk module=service status=ok total={} succeeded={} failed={}",
            report.total(),
            report.succeeded,
            report.failed.len()
        );
        Ok(report)
    }

    /// Author record that still needs enrichment, or `None` when the name is
    /// blank or the stored profile is complete. Unknown names yield a fresh
    /// unsaved record.
    fn pending_profile(&self, name: &str) -> RepoResult<Option<PendingProfile>> {
        if name.trim().is_empty() {
            return Ok(None);
        }
        match self.repo.find_author_by_name(name)? {
            Some(author) if author.is_profile_complete() => Ok(None),
            Some(author) => Ok(Some(PendingProfile {
                author,
                stored: true,
            })),
            None => Ok(Some(PendingProfile {
                author: Author::new(name),
                stored: false,
            })),
        }
    }

    fn store_profile(
        &self,
        pending: PendingProfile,
        data: Option<ProfileData>,
    ) -> RepoResult<ProfileOutcome> {
        let PendingProfile { mut author, stored } = pending;
        let changed = data.is_some_and(|data| merge_profile(&mut author, data));

        let outcome = if !stored {
            self.repo.create_author(&author)?;
            ProfileOutcome::Created(author)
        } else if changed {
            self.repo.update_author(&author)?;
            ProfileOutcome::Updated(author)
        } else {
            ProfileOutcome::Unchanged
        };
        info!(
            "event=author_enrich module=service status=ok outcome={}",
            outcome.label()
        );
        Ok(outcome)
    }
}

struct PendingProfile {
    author: Author,
    /// Whether the author row already exists.
    stored: bool,
}

/// Copies fields from `data` into empty fields of `author`.
///
/// Photo URLs that are not http(s) links are dropped. Returns whether
/// anything changed.
pub fn merge_profile(author: &mut Author, data: ProfileData) -> bool {
    let mut changed = false;

    if is_blank(author.description.as_deref()) {
        if let Some(description) = data.description.filter(|text| !text.trim().is_empty()) {
            author.description = Some(description.trim().to_string());
            changed = true;
        }
    }

    if is_blank(author.profile_url.as_deref()) {
        if let Some(url) = data.image_url {
            if check_link("profile_url", Some(url.as_str())).is_ok() {
                author.profile_url = Some(url);
                changed = true;
            } else {
                warn!("event=author_enrich module=service status=skipped reason=invalid_image_url");
            }
        }
    }

    changed
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |text| text.trim().is_empty())
}
