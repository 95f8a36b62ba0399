//! Core domain logic for QuoteDesk.
//! Quote storage, duplicate detection, search, export and author enrichment.

pub mod config;
pub mod db;
pub mod enrich;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod similarity;

pub use config::{AppConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::author::{Author, AuthorId};
pub use model::quote::{NewQuote, Quote, QuoteId};
pub use model::super_subject::{SuperSubject, SuperSubjectId};
pub use model::ValidationError;
pub use repo::author_repo::{AuthorRepository, SqliteAuthorRepository};
pub use repo::quote_repo::{
    QuoteListQuery, QuoteRepository, QuoteSortKey, SortDirection, SqliteQuoteRepository,
    SubjectCount,
};
pub use repo::super_subject_repo::{SqliteSuperSubjectRepository, SuperSubjectRepository};
pub use repo::{RepoError, RepoResult};
pub use search::fts::{search_quotes, QuoteSearchHit, QuoteSearchQuery, SearchError, SearchResult};
pub use service::author_service::{AuthorService, AuthorServiceError, ProfileOutcome};
pub use service::quote_service::{
    AddQuoteOutcome, DuplicateMatch, DuplicateStatus, ImportReport, QuoteService,
    QuoteServiceError, QuotesPage,
};
pub use service::super_subject_service::SuperSubjectService;
pub use similarity::{
    calculate_similarity, find_similar_quote, levenshtein_distance, Candidate, DuplicatePolicy,
    DuplicateVerdict, MatchResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
