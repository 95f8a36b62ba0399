//! Quote/subject repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist quotes together with their ordered subject links.
//! - Provide the candidate list consumed by duplicate checks.
//! - Own subject-wide maintenance (counts, rename, removal).
//!
//! # Invariants
//! - A quote and its subject links are written in one transaction.
//! - `list_candidates` returns quotes in insertion order, so the matcher's
//!   earliest-wins tie-break favors the oldest stored quote.
//! - Subject names are persisted lowercase.

use crate::db::now_epoch_ms;
use crate::model::quote::{Quote, QuoteId};
use crate::model::subject::normalize_subject;
use crate::repo::{ensure_tables, parse_uuid, RepoError, RepoResult};
use crate::similarity::Candidate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const QUOTES_DEFAULT_LIMIT: u32 = 50;
const QUOTES_LIMIT_MAX: u32 = 500;

const QUOTE_SELECT_SQL: &str = "SELECT
    id,
    author,
    quote_text,
    author_link,
    video_link,
    contributed_by,
    created_at,
    updated_at
FROM quotes";

/// Sortable quote table columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuoteSortKey {
    #[default]
    UpdatedAt,
    CreatedAt,
    Author,
    QuoteText,
}

impl QuoteSortKey {
    fn column(self) -> &'static str {
        match self {
            Self::UpdatedAt => "updated_at",
            Self::CreatedAt => "created_at",
            Self::Author => "author COLLATE NOCASE",
            Self::QuoteText => "quote_text COLLATE NOCASE",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// Filter, sort and pagination options for quote listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteListQuery {
    /// Exact author match, case-insensitive.
    pub author: Option<String>,
    /// Single subject filter, case-insensitive.
    pub subject: Option<String>,
    pub sort: QuoteSortKey,
    pub direction: SortDirection,
    /// Defaults to 50 and clamps to 500.
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Number of quotes tagged with one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectCount {
    pub subject: String,
    pub count: u32,
}

/// Repository interface for quotes and subject links.
pub trait QuoteRepository {
    /// Inserts one quote with its subjects and returns its id.
    fn create_quote(&mut self, quote: &Quote) -> RepoResult<QuoteId>;
    /// Inserts many quotes in one transaction; ids keep input order.
    fn create_quotes(&mut self, quotes: &[Quote]) -> RepoResult<Vec<QuoteId>>;
    fn get_quote(&self, id: QuoteId) -> RepoResult<Option<Quote>>;
    /// Replaces all mutable fields and the subject set.
    fn update_quote(&mut self, quote: &Quote) -> RepoResult<()>;
    fn delete_quote(&self, id: QuoteId) -> RepoResult<()>;
    fn list_quotes(&self, query: &QuoteListQuery) -> RepoResult<Vec<Quote>>;
    /// All stored quotes as matcher candidates, oldest first.
    fn list_candidates(&self) -> RepoResult<Vec<Candidate>>;
    /// Subjects in use, sorted by name.
    fn subject_counts(&self) -> RepoResult<Vec<SubjectCount>>;
    /// Re-points every use of `from` to `to`; returns affected quote count.
    fn rename_subject(&mut self, from: &str, to: &str) -> RepoResult<u32>;
    /// Drops `subject` from every quote; returns affected quote count.
    fn remove_subject(&mut self, subject: &str) -> RepoResult<u32>;
}

/// SQLite-backed quote repository.
pub struct SqliteQuoteRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteQuoteRepository<'conn> {
    /// Wraps a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["quotes", "subjects", "quote_subjects"])?;
        Ok(Self { conn })
    }
}

impl QuoteRepository for SqliteQuoteRepository<'_> {
    fn create_quote(&mut self, quote: &Quote) -> RepoResult<QuoteId> {
        quote.validate()?;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        insert_quote(&tx, quote, now_epoch_ms())?;
        tx.commit()?;
        Ok(quote.id)
    }

    fn create_quotes(&mut self, quotes: &[Quote]) -> RepoResult<Vec<QuoteId>> {
        for quote in quotes {
            quote.validate()?;
        }

        let now = now_epoch_ms();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut ids = Vec::with_capacity(quotes.len());
        for quote in quotes {
            insert_quote(&tx, quote, now)?;
            ids.push(quote.id);
        }
        tx.commit()?;
        Ok(ids)
    }

    fn get_quote(&self, id: QuoteId) -> RepoResult<Option<Quote>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{QUOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_quote_row(self.conn, row)?)),
            None => Ok(None),
        }
    }

    fn update_quote(&mut self, quote: &Quote) -> RepoResult<()> {
        quote.validate()?;
        let id_text = quote.id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let changed = tx.execute(
            "UPDATE quotes
             SET
                author = ?2,
                quote_text = ?3,
                author_link = ?4,
                video_link = ?5,
                contributed_by = ?6,
                updated_at = ?7
             WHERE id = ?1;",
            params![
                id_text,
                quote.author.as_str(),
                quote.quote_text.as_str(),
                quote.author_link.as_deref(),
                quote.video_link.as_deref(),
                quote.contributed_by.as_deref(),
                now_epoch_ms(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(quote.id));
        }

        replace_subjects(&tx, &id_text, &quote.subjects)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_quote(&self, id: QuoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM quotes WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn list_quotes(&self, query: &QuoteListQuery) -> RepoResult<Vec<Quote>> {
        let mut sql = format!("{QUOTE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(author) = query.author.as_deref().map(str::trim) {
            sql.push_str(" AND author = ? COLLATE NOCASE");
            bind_values.push(Value::Text(author.to_string()));
        }

        if let Some(subject) = query.subject.as_deref().and_then(normalize_subject) {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM quote_subjects qs
                    INNER JOIN subjects s ON s.id = qs.subject_id
                    WHERE qs.quote_id = quotes.id
                      AND s.name = ?
                )",
            );
            bind_values.push(Value::Text(subject));
        }

        let direction = match query.direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        sql.push_str(&format!(
            " ORDER BY {} {direction}, id ASC LIMIT ?",
            query.sort.column()
        ));
        bind_values.push(Value::Integer(i64::from(normalize_quote_limit(query.limit))));
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut quotes = Vec::new();
        while let Some(row) = rows.next()? {
            quotes.push(parse_quote_row(self.conn, row)?);
        }
        Ok(quotes)
    }

    fn list_candidates(&self) -> RepoResult<Vec<Candidate>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, quote_text, author FROM quotes ORDER BY seq ASC;")?;
        let rows = stmt.query_map([], |row| {
            Ok(Candidate::new(
                row.get::<_, String>("id")?,
                row.get::<_, String>("quote_text")?,
                row.get::<_, String>("author")?,
            ))
        })?;
        let candidates = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(candidates)
    }

    fn subject_counts(&self) -> RepoResult<Vec<SubjectCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.name AS name, COUNT(qs.quote_id) AS quote_count
             FROM subjects s
             INNER JOIN quote_subjects qs ON qs.subject_id = s.id
             GROUP BY s.id
             ORDER BY s.name ASC;",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SubjectCount {
                subject: row.get::<_, String>("name")?.to_lowercase(),
                count: row.get("quote_count")?,
            })
        })?;
        let counts = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }

    fn rename_subject(&mut self, from: &str, to: &str) -> RepoResult<u32> {
        let (Some(from), Some(to)) = (normalize_subject(from), normalize_subject(to)) else {
            return Ok(0);
        };
        if from == to {
            return Ok(0);
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let Some(from_id) = subject_id(&tx, &from)? else {
            return Ok(0);
        };
        let affected = touch_quotes_with_subject(&tx, from_id)?;
        let to_id = ensure_subject(&tx, &to)?;

        tx.execute(
            "UPDATE OR IGNORE quote_subjects SET subject_id = ?2 WHERE subject_id = ?1;",
            params![from_id, to_id],
        )?;
        // Quotes already tagged with `to` keep their existing link.
        tx.execute(
            "DELETE FROM quote_subjects WHERE subject_id = ?1;",
            [from_id],
        )?;
        tx.execute("DELETE FROM subjects WHERE id = ?1;", [from_id])?;
        tx.commit()?;
        Ok(affected)
    }

    fn remove_subject(&mut self, subject: &str) -> RepoResult<u32> {
        let Some(subject) = normalize_subject(subject) else {
            return Ok(0);
        };

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let Some(id) = subject_id(&tx, &subject)? else {
            return Ok(0);
        };
        let affected = touch_quotes_with_subject(&tx, id)?;
        tx.execute("DELETE FROM subjects WHERE id = ?1;", [id])?;
        tx.commit()?;
        Ok(affected)
    }
}

/// Normalizes list limit according to the quote table contract.
pub fn normalize_quote_limit(limit: Option<u32>) -> u32 {
    match limit {
        None | Some(0) => QUOTES_DEFAULT_LIMIT,
        Some(value) => value.min(QUOTES_LIMIT_MAX),
    }
}

fn insert_quote(tx: &Transaction<'_>, quote: &Quote, now: i64) -> RepoResult<()> {
    let created_at = if quote.created_at > 0 {
        quote.created_at
    } else {
        now
    };
    let updated_at = quote.updated_at.max(created_at);
    let id_text = quote.id.to_string();

    tx.execute(
        "INSERT INTO quotes (
            id,
            author,
            quote_text,
            author_link,
            video_link,
            contributed_by,
            created_at,
            updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
        params![
            id_text,
            quote.author.as_str(),
            quote.quote_text.as_str(),
            quote.author_link.as_deref(),
            quote.video_link.as_deref(),
            quote.contributed_by.as_deref(),
            created_at,
            updated_at,
        ],
    )
    .map_err(|err| super::map_unique_violation(err, format!("quote id {id_text} already exists")))?;

    replace_subjects(tx, &id_text, &quote.subjects)
}

fn replace_subjects(tx: &Transaction<'_>, quote_id: &str, subjects: &[String]) -> RepoResult<()> {
    tx.execute("DELETE FROM quote_subjects WHERE quote_id = ?1;", [quote_id])?;

    let mut position = 0i64;
    for subject in subjects.iter().filter_map(|s| normalize_subject(s)) {
        let subject_id = ensure_subject(tx, &subject)?;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO quote_subjects (quote_id, subject_id, position)
             VALUES (?1, ?2, ?3);",
            params![quote_id, subject_id, position],
        )?;
        position += inserted as i64;
    }
    Ok(())
}

fn ensure_subject(tx: &Transaction<'_>, name: &str) -> RepoResult<i64> {
    tx.execute("INSERT OR IGNORE INTO subjects (name) VALUES (?1);", [name])?;
    subject_id(tx, name)?
        .ok_or_else(|| RepoError::InvalidData(format!("subject `{name}` missing after insert")))
}

fn subject_id(tx: &Transaction<'_>, name: &str) -> RepoResult<Option<i64>> {
    let mut stmt = tx.prepare("SELECT id FROM subjects WHERE name = ?1;")?;
    let mut rows = stmt.query([name])?;
    match rows.next()? {
        Some(row) => Ok(Some(row.get(0)?)),
        None => Ok(None),
    }
}

fn touch_quotes_with_subject(tx: &Transaction<'_>, subject_id: i64) -> RepoResult<u32> {
    let changed = tx.execute(
        "UPDATE quotes
         SET updated_at = ?2
         WHERE id IN (SELECT quote_id FROM quote_subjects WHERE subject_id = ?1);",
        params![subject_id, now_epoch_ms()],
    )?;
    u32::try_from(changed)
        .map_err(|_| RepoError::InvalidData(format!("affected row count {changed} overflows")))
}

fn load_subjects(conn: &Connection, quote_id: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT s.name
         FROM quote_subjects qs
         INNER JOIN subjects s ON s.id = qs.subject_id
         WHERE qs.quote_id = ?1
         ORDER BY qs.position ASC;",
    )?;
    let rows = stmt.query_map([quote_id], |row| row.get::<_, String>(0))?;
    let mut subjects = Vec::new();
    for name in rows {
        subjects.push(name?.to_lowercase());
    }
    Ok(subjects)
}

fn parse_quote_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Quote> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "quotes.id")?;
    let quote = Quote {
        id,
        author: row.get("author")?,
        quote_text: row.get("quote_text")?,
        subjects: load_subjects(conn, &id_text)?,
        author_link: row.get("author_link")?,
        video_link: row.get("video_link")?,
        contributed_by: row.get("contributed_by")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    quote.validate()?;
    Ok(quote)
}
