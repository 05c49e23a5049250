//! User repository contract and SQLite implementation.
//!
//! # Invariants
//! - `external_id` stays unique; one platform account maps to one user row.
//! - Progress writes persist `level`, `experience` and `completed_tasks`
//!   together, so counters can never drift apart mid-update.

use crate::model::user::{User, UserId};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT
    uuid,
    external_id,
    display_name,
    level,
    experience,
    completed_tasks,
    registered_at
FROM users";

/// Repository interface for user records and progression counters.
pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn get_user_by_external_id(&self, external_id: i64) -> RepoResult<Option<User>>;
    fn list_users(&self) -> RepoResult<Vec<User>>;
    /// Persists the progression counters of an already-loaded user.
    fn update_progress(&self, user: &User) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        self.conn.execute(
            "INSERT INTO users (
                uuid,
                external_id,
                display_name,
                level,
                experience,
                completed_tasks,
                registered_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                user.uuid.to_string(),
                user.external_id,
                user.display_name.as_str(),
                user.level,
                user.experience,
                user.completed_tasks,
                user.registered_at,
            ],
        )?;

        Ok(user.uuid)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn get_user_by_external_id(&self, external_id: i64) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE external_id = ?1;"))?;

        let mut rows = stmt.query([external_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY registered_at ASC;"))?;

        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }

        Ok(users)
    }

    fn update_progress(&self, user: &User) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users
             SET
                level = ?1,
                experience = ?2,
                completed_tasks = ?3
             WHERE uuid = ?4;",
            params![
                user.level,
                user.experience,
                user.completed_tasks,
                user.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "user",
                id: user.uuid,
            });
        }

        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let uuid_text: String = row.get("uuid")?;

    Ok(User {
        uuid: parse_uuid(&uuid_text, "users.uuid")?,
        external_id: row.get("external_id")?,
        display_name: row.get("display_name")?,
        level: row.get("level")?,
        experience: row.get("experience")?,
        completed_tasks: row.get("completed_tasks")?,
        registered_at: row.get("registered_at")?,
    })
}
