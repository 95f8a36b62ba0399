//! Super-subject repository contract and SQLite implementation.
//!
//! # Invariants
//! - A grouping and its member lists are replaced in one transaction.
//! - Member order is preserved via `position`.

use crate::db::now_epoch_ms;
use crate::model::super_subject::{SuperSubject, SuperSubjectId};
use crate::repo::{ensure_tables, map_unique_violation, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

const MEMBER_KIND_SUBJECT: &str = "subject";
const MEMBER_KIND_AUTHOR: &str = "author";

pub trait SuperSubjectRepository {
    /// Inserts or fully replaces one grouping by id.
    fn upsert_super_subject(&mut self, group: &SuperSubject) -> RepoResult<SuperSubjectId>;
    fn get_super_subject(&self, id: SuperSubjectId) -> RepoResult<Option<SuperSubject>>;
    /// All groupings sorted by name.
    fn list_super_subjects(&self) -> RepoResult<Vec<SuperSubject>>;
    fn delete_super_subject(&self, id: SuperSubjectId) -> RepoResult<()>;
}

pub struct SqliteSuperSubjectRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteSuperSubjectRepository<'conn> {
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["super_subjects", "super_subject_members"])?;
        Ok(Self { conn })
    }
}

impl SuperSubjectRepository for SqliteSuperSubjectRepository<'_> {
    fn upsert_super_subject(&mut self, group: &SuperSubject) -> RepoResult<SuperSubjectId> {
        group.validate()?;
        let id_text = group.id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO super_subjects (id, name, image, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                image = excluded.image,
                updated_at = excluded.updated_at;",
            params![id_text, group.name.trim(), group.image.as_deref(), now_epoch_ms()],
        )
        .map_err(|err| map_unique_violation(err, format!("super subject `{}`", group.name)))?;

        tx.execute(
            "DELETE FROM super_subject_members WHERE super_subject_id = ?1;",
            [id_text.as_str()],
        )?;
        insert_members(&tx, &id_text, MEMBER_KIND_SUBJECT, &group.subjects)?;
        insert_members(&tx, &id_text, MEMBER_KIND_AUTHOR, &group.authors)?;
        tx.commit()?;
        Ok(group.id)
    }

    fn get_super_subject(&self, id: SuperSubjectId) -> RepoResult<Option<SuperSubject>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, image, updated_at FROM super_subjects WHERE id = ?1;",
                [id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((id_text, name, image, updated_at)) => Ok(Some(self.assemble(
                &id_text, name, image, updated_at,
            )?)),
            None => Ok(None),
        }
    }

    fn list_super_subjects(&self) -> RepoResult<Vec<SuperSubject>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, image, updated_at
             FROM super_subjects
             ORDER BY name COLLATE NOCASE ASC;",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id_text, name, image, updated_at)| {
                self.assemble(&id_text, name, image, updated_at)
            })
            .collect()
    }

    fn delete_super_subject(&self, id: SuperSubjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM super_subjects WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

impl SqliteSuperSubjectRepository<'_> {
    fn assemble(
        &self,
        id_text: &str,
        name: String,
        image: Option<String>,
        updated_at: i64,
    ) -> RepoResult<SuperSubject> {
        Ok(SuperSubject {
            id: parse_uuid(id_text, "super_subjects.id")?,
            name,
            subjects: load_members(self.conn, id_text, MEMBER_KIND_SUBJECT)?,
            authors: load_members(self.conn, id_text, MEMBER_KIND_AUTHOR)?,
            image,
            updated_at,
        })
    }
}

fn insert_members(
    tx: &Transaction<'_>,
    group_id: &str,
    kind: &str,
    values: &[String],
) -> RepoResult<()> {
    for (position, value) in values.iter().enumerate() {
        tx.execute(
            "INSERT OR IGNORE INTO super_subject_members (super_subject_id, kind, value, position)
             VALUES (?1, ?2, ?3, ?4);",
            params![group_id, kind, value.as_str(), position as i64],
        )?;
    }
    Ok(())
}

fn load_members(conn: &Connection, group_id: &str, kind: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT value
         FROM super_subject_members
         WHERE super_subject_id = ?1 AND kind = ?2
         ORDER BY position ASC;",
    )?;
    let values = stmt
        .query_map(params![group_id, kind], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(values)
}
