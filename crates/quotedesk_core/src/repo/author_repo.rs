//! Author repository contract and SQLite implementation.
//!
//! # Invariants
//! - Author names are unique; a second insert with the same name is a
//!   `RepoError::Conflict`.
//! - Name lookups compare trimmed values exactly, matching how quotes
//!   reference their author.

use crate::db::now_epoch_ms;
use crate::model::author::{Author, AuthorId};
use crate::repo::{ensure_tables, map_unique_violation, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const AUTHOR_SELECT_SQL: &str = "SELECT
    id,
    name,
    profile_url,
    description,
    amazon_page,
    amazon_affiliate,
    created_at,
    updated_at
FROM authors";

/// Repository interface for author profiles.
pub trait AuthorRepository {
    fn create_author(&self, author: &Author) -> RepoResult<AuthorId>;
    fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>>;
    fn find_author_by_name(&self, name: &str) -> RepoResult<Option<Author>>;
    /// Replaces all profile fields of an existing author.
    fn update_author(&self, author: &Author) -> RepoResult<()>;
    fn delete_author(&self, id: AuthorId) -> RepoResult<()>;
    /// All authors sorted by name.
    fn list_authors(&self) -> RepoResult<Vec<Author>>;
    /// Distinct trimmed author names used by quotes but absent from authors.
    fn list_unregistered_quote_authors(&self) -> RepoResult<Vec<String>>;
}

/// SQLite-backed author repository.
pub struct SqliteAuthorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuthorRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["authors", "quotes"])?;
        Ok(Self { conn })
    }
}

impl AuthorRepository for SqliteAuthorRepository<'_> {
    fn create_author(&self, author: &Author) -> RepoResult<AuthorId> {
        author.validate()?;
        let now = now_epoch_ms();
        self.conn
            .execute(
                "INSERT INTO authors (
                    id,
                    name,
                    profile_url,
                    description,
                    amazon_page,
                    amazon_affiliate,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7);",
                params![
                    author.id.to_string(),
                    author.name.trim(),
                    author.profile_url.as_deref(),
                    author.description.as_deref(),
                    author.amazon_page.as_deref(),
                    author.amazon_affiliate.as_deref(),
                    now,
                ],
            )
            .map_err(|err| map_unique_violation(err, format!("author `{}`", author.name.trim())))?;
        Ok(author.id)
    }

    fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        let row = self
            .conn
            .query_row(
                &format!("{AUTHOR_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                read_author_columns,
            )
            .optional()?;
        row.map(AuthorColumns::into_author).transpose()
    }

    fn find_author_by_name(&self, name: &str) -> RepoResult<Option<Author>> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let row = self
            .conn
            .query_row(
                &format!("{AUTHOR_SELECT_SQL} WHERE name = ?1;"),
                [trimmed],
                read_author_columns,
            )
            .optional()?;
        row.map(AuthorColumns::into_author).transpose()
    }

    fn update_author(&self, author: &Author) -> RepoResult<()> {
        author.validate()?;
        let changed = self
            .conn
            .execute(
                "UPDATE authors
                 SET
                    name = ?2,
                    profile_url = ?3,
                    description = ?4,
                    amazon_page = ?5,
                    amazon_affiliate = ?6,
                    updated_at = ?7
                 WHERE id = ?1;",
                params![
                    author.id.to_string(),
                    author.name.trim(),
                    author.profile_url.as_deref(),
                    author.description.as_deref(),
                    author.amazon_page.as_deref(),
                    author.amazon_affiliate.as_deref(),
                    now_epoch_ms(),
                ],
            )
            .map_err(|err| map_unique_violation(err, format!("author `{}`", author.name.trim())))?;
        if changed == 0 {
            return Err(RepoError::NotFound(author.id));
        }
        Ok(())
    }

    fn delete_author(&self, id: AuthorId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM authors WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn list_authors(&self) -> RepoResult<Vec<Author>> {
        let mut stmt = self.conn.prepare(&format!(
            "{AUTHOR_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let rows = stmt.query_map([], read_author_columns)?;
        let mut authors = Vec::new();
        for columns in rows {
            authors.push(columns?.into_author()?);
        }
        Ok(authors)
    }

    fn list_unregistered_quote_authors(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT trim(q.author) AS name
             FROM quotes q
             WHERE trim(q.author) <> ''
               AND NOT EXISTS (
                   SELECT 1 FROM authors a WHERE a.name = trim(q.author)
               )
             ORDER BY name ASC;",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>("name"))?;
        let names = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }
}

/// Raw row values; uuid parsing happens outside the rusqlite row callback so
/// it can report `RepoError::InvalidData`.
struct AuthorColumns {
    id: String,
    name: String,
    profile_url: Option<String>,
    description: Option<String>,
    amazon_page: Option<String>,
    amazon_affiliate: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl AuthorColumns {
    fn into_author(self) -> RepoResult<Author> {
        Ok(Author {
            id: parse_uuid(&self.id, "authors.id")?,
            name: self.name,
            profile_url: self.profile_url,
            description: self.description,
            amazon_page: self.amazon_page,
            amazon_affiliate: self.amazon_affiliate,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn read_author_columns(row: &Row<'_>) -> rusqlite::Result<AuthorColumns> {
    Ok(AuthorColumns {
        id: row.get("id")?,
        name: row.get("name")?,
        profile_url: row.get("profile_url")?,
        description: row.get("description")?,
        amazon_page: row.get("amazon_page")?,
        amazon_affiliate: row.get("amazon_affiliate")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
