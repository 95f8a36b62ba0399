//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define per-aggregate data access traits (quotes, authors, groupings).
//! - Keep SQL details out of the service layer.
//!
//! # Invariants
//! - Write paths validate records before any SQL mutation.
//! - Read paths reject malformed persisted rows instead of masking them.
//! - Missing targets surface as `RepoError::NotFound`, not silent no-ops.

pub mod author_repo;
pub mod quote_repo;
pub mod super_subject_repo;

use crate::db::DbError;
use crate::model::ValidationError;
use rusqlite::{Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all aggregates.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound(Uuid),
    /// Unique constraint hit, e.g. a second author with the same name.
    Conflict(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::Conflict(message) => write!(f, "conflicting record: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::Conflict(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

/// Maps unique-constraint failures to `Conflict`, everything else to `Db`.
pub(crate) fn map_unique_violation(err: rusqlite::Error, what: impl Into<String>) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            RepoError::Conflict(what.into())
        }
        _ => RepoError::from(err),
    }
}

pub(crate) fn ensure_tables(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    for table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type IN ('table', 'view') AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::InvalidData(format!(
                "required table `{table}` is missing; open the database with open_db"
            )));
        }
    }
    Ok(())
}
