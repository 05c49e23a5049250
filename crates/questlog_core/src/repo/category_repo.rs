//! Category repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Ownership-scoped CRUD over `task_categories`.
//!
//! # Invariants
//! - Deleting an owned category clears `category_uuid` on referencing tasks
//!   through the `ON DELETE SET NULL` foreign key; task rows are never
//!   deleted.
//! - A delete scoped to a non-owner changes nothing, including task
//!   references.

use crate::model::category::{Category, CategoryId};
use crate::model::user::UserId;
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const CATEGORY_SELECT_SQL: &str = "SELECT
    uuid,
    user_uuid,
    name,
    color,
    created_at
FROM task_categories";

/// Per-category task totals for the stats view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStat {
    /// `None` is the bucket of tasks with no category.
    pub category: Option<Category>,
    pub total_tasks: i64,
    pub done_tasks: i64,
}

/// Repository interface for category records.
pub trait CategoryRepository {
    fn create_category(&self, category: &Category) -> RepoResult<CategoryId>;
    fn get_category(&self, id: CategoryId, user: UserId) -> RepoResult<Option<Category>>;
    fn list_categories(&self, user: UserId) -> RepoResult<Vec<Category>>;
    /// Persists all mutable fields of an already-loaded category.
    fn update_category(&self, category: &Category) -> RepoResult<()>;
    /// Removes the row; the foreign key clears task references. Returns
    /// `false` (touching nothing) when no owned row matched.
    fn delete_category(&self, id: CategoryId, user: UserId) -> RepoResult<bool>;
    /// Task totals per category plus an uncategorized bucket, ordered by name.
    fn category_stats(&self, user: UserId) -> RepoResult<Vec<CategoryStat>>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn create_category(&self, category: &Category) -> RepoResult<CategoryId> {
        category.validate()?;

        self.conn.execute(
            "INSERT INTO task_categories (
                uuid,
                user_uuid,
                name,
                color,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                category.uuid.to_string(),
                category.user_uuid.to_string(),
                category.name.as_str(),
                category.color.as_str(),
                category.created_at,
            ],
        )?;

        Ok(category.uuid)
    }

    fn get_category(&self, id: CategoryId, user: UserId) -> RepoResult<Option<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL} WHERE uuid = ?1 AND user_uuid = ?2;"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), user.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_category_row(row)?));
        }

        Ok(None)
    }

    fn list_categories(&self, user: UserId) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL} WHERE user_uuid = ?1 ORDER BY name COLLATE NOCASE ASC;"
        ))?;

        let mut rows = stmt.query([user.to_string()])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }

        Ok(categories)
    }

    fn update_category(&self, category: &Category) -> RepoResult<()> {
        category.validate()?;

        let changed = self.conn.execute(
            "UPDATE task_categories
             SET
                name = ?1,
                color = ?2
             WHERE uuid = ?3
               AND user_uuid = ?4;",
            params![
                category.name.as_str(),
                category.color.as_str(),
                category.uuid.to_string(),
                category.user_uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "category",
                id: category.uuid,
            });
        }

        Ok(())
    }

    fn delete_category(&self, id: CategoryId, user: UserId) -> RepoResult<bool> {
        // Task references clear via ON DELETE SET NULL, so a delete that
        // matches no owned row leaves other users' tasks untouched.
        let changed = self.conn.execute(
            "DELETE FROM task_categories WHERE uuid = ?1 AND user_uuid = ?2;",
            params![id.to_string(), user.to_string()],
        )?;

        Ok(changed > 0)
    }

    fn category_stats(&self, user: UserId) -> RepoResult<Vec<CategoryStat>> {
        let mut stats = Vec::new();

        let mut stmt = self.conn.prepare(
            "SELECT
                c.uuid,
                c.user_uuid,
                c.name,
                c.color,
                c.created_at,
                COUNT(t.uuid) AS total_tasks,
                COALESCE(SUM(CASE WHEN t.status = 'done' THEN 1 ELSE 0 END), 0) AS done_tasks
             FROM task_categories c
             LEFT JOIN tasks t
               ON t.category_uuid = c.uuid
              AND t.user_uuid = c.user_uuid
             WHERE c.user_uuid = ?1
             GROUP BY c.uuid
             ORDER BY c.name COLLATE NOCASE ASC;",
        )?;

        let mut rows = stmt.query([user.to_string()])?;
        while let Some(row) = rows.next()? {
            stats.push(CategoryStat {
                category: Some(parse_category_row(row)?),
                total_tasks: row.get("total_tasks")?,
                done_tasks: row.get("done_tasks")?,
            });
        }

        let (total_tasks, done_tasks) = self.conn.query_row(
            "SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN status = 'done' THEN 1 ELSE 0 END), 0)
             FROM tasks
             WHERE user_uuid = ?1
               AND category_uuid IS NULL;",
            [user.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        stats.push(CategoryStat {
            category: None,
            total_tasks,
            done_tasks,
        });

        Ok(stats)
    }
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    let uuid_text: String = row.get("uuid")?;
    let user_uuid_text: String = row.get("user_uuid")?;

    Ok(Category {
        uuid: parse_uuid(&uuid_text, "task_categories.uuid")?,
        user_uuid: parse_uuid(&user_uuid_text, "task_categories.user_uuid")?,
        name: row.get("name")?,
        color: row.get("color")?,
        created_at: row.get("created_at")?,
    })
}
