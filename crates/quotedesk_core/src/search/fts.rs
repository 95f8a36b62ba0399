//! SQLite FTS5-based quote search.
//!
//! # Invariants
//! - Blank queries return no hits without touching the index.
//! - Result ordering is deterministic: rank, then `updated_at`, then id.

use crate::db::DbError;
use crate::model::quote::QuoteId;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const DEFAULT_SEARCH_LIMIT: u32 = 20;

pub type SearchResult<T> = Result<T, SearchError>;

#[derive(Debug)]
pub enum SearchError {
    /// Raw FTS5 expression failed to parse.
    InvalidQuery { query: String, message: String },
    Db(DbError),
    InvalidData(String),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidQuery { query, message } => {
                write!(f, "invalid full-text query `{query}`: {message}")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid search row: {message}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidQuery { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Search options.
#[derive(Debug, Clone)]
pub struct QuoteSearchQuery {
    pub text: String,
    /// Restrict hits to one author (case-insensitive exact match).
    pub author: Option<String>,
    pub limit: u32,
    /// Pass `text` to FTS5 unescaped. Off by default so arbitrary input
    /// never produces syntax errors.
    pub raw_fts_syntax: bool,
}

impl QuoteSearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: None,
            limit: DEFAULT_SEARCH_LIMIT,
            raw_fts_syntax: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteSearchHit {
    pub quote_id: QuoteId,
    pub author: String,
    /// Quote text excerpt with matches wrapped in `[` `]`.
    pub snippet: String,
}

/// Searches quotes via FTS5 and returns ranked hits.
pub fn search_quotes(conn: &Connection, query: &QuoteSearchQuery) -> SearchResult<Vec<QuoteSearchHit>> {
    let Some(match_expr) = build_match_expression(query) else {
        return Ok(Vec::new());
    };
    if query.limit == 0 {
        return Ok(Vec::new());
    }

    let mut sql = String::from(
        "SELECT
            quotes.id AS id,
            quotes.author AS author,
            snippet(quotes_fts, 0, '[', ']', ' ... ', 12) AS snippet
         FROM quotes_fts
         JOIN quotes ON quotes.seq = quotes_fts.rowid
         WHERE quotes_fts MATCH ?",
    );
    let mut bind_values: Vec<Value> = vec![Value::Text(match_expr.clone())];

    if let Some(author) = query.author.as_deref().map(str::trim) {
        sql.push_str(" AND quotes.author = ? COLLATE NOCASE");
        bind_values.push(Value::Text(author.to_string()));
    }

    sql.push_str(" ORDER BY bm25(quotes_fts), quotes.updated_at DESC, quotes.id ASC LIMIT ?");
    bind_values.push(Value::Integer(i64::from(query.limit)));

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt
        .query(params_from_iter(bind_values))
        .map_err(|err| map_query_error(err, &match_expr))?;
    let mut hits = Vec::new();
    while let Some(row) = rows
        .next()
        .map_err(|err| map_query_error(err, &match_expr))?
    {
        hits.push(parse_hit(row)?);
    }
    Ok(hits)
}

fn parse_hit(row: &Row<'_>) -> SearchResult<QuoteSearchHit> {
    let id_text: String = row.get("id")?;
    let quote_id = Uuid::parse_str(&id_text)
        .map_err(|_| SearchError::InvalidData(format!("invalid uuid `{id_text}`")))?;
    Ok(QuoteSearchHit {
        quote_id,
        author: row.get("author")?,
        snippet: row.get("snippet")?,
    })
}

fn build_match_expression(query: &QuoteSearchQuery) -> Option<String> {
    let text = query.text.trim();
    if text.is_empty() {
        return None;
    }
    if query.raw_fts_syntax {
        return Some(text.to_string());
    }

    let terms: Vec<String> = text.split_whitespace().map(escape_fts_term).collect();
    Some(terms.join(" AND "))
}

fn escape_fts_term(raw: &str) -> String {
    format!("\"{}\"", raw.replace('"', "\"\""))
}

fn map_query_error(err: rusqlite::Error, query: &str) -> SearchError {
    let is_syntax = match &err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => {
            let message = message.to_lowercase();
            (message.contains("fts5") && message.contains("syntax"))
                || message.contains("malformed match expression")
                || message.contains("unterminated")
                || message.contains("no such column")
        }
        _ => false,
    };

    if is_syntax {
        SearchError::InvalidQuery {
            query: query.to_string(),
            message: err.to_string(),
        }
    } else {
        SearchError::Db(DbError::Sqlite(err))
    }
}

#[cfg(test)]
mod tests {
    use super::{build_match_expression, QuoteSearchQuery};

    #[test]
    fn terms_are_quoted_and_joined() {
        let query = QuoteSearchQuery::new("  stay \"hungry\" ");
        assert_eq!(
            build_match_expression(&query).as_deref(),
            Some("\"stay\" AND \"\"\"hungry\"\"\"")
        );
    }

    #[test]
    fn blank_query_has_no_expression() {
        assert_eq!(build_match_expression(&QuoteSearchQuery::new("   ")), None);
    }
}
