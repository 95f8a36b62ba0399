//! Best-effort metadata enrichment plumbing.
//!
//! # Responsibility
//! - Model ordered profile lookups as a first-success fallback chain.
//! - Run independent lookups on a bounded worker pool with per-item
//!   success/failure accounting.
//! - Provide the Wikipedia summary source used to fill author profiles.
//!
//! # Invariants
//! - Source failures never abort a chain; they are logged and skipped.
//! - Pool jobs are not retried or cancelled; every item gets one outcome.

pub mod pool;
pub mod source;
pub mod wikipedia;

pub use pool::{run_bounded, BatchFailure, BatchReport, BatchRun, PoolError};
pub use source::{first_success, ProfileData, ProfileSource, SourceChain, SourceError};
pub use wikipedia::WikipediaSummarySource;
