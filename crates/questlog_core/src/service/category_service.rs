//! Category manager.
//!
//! # Invariants
//! - All operations are scoped to `(id, user)`; cross-user access reads as
//!   not-found.
//! - Deleting a category never deletes tasks; their reference clears.

use crate::model::category::{Category, CategoryId};
use crate::model::user::UserId;
use crate::repo::category_repo::{CategoryRepository, CategoryStat};
use crate::repo::RepoResult;
use log::info;

/// Partial update for an existing category.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Use-case service for task categories.
pub struct CategoryService<R: CategoryRepository> {
    repo: R,
}

impl<R: CategoryRepository> CategoryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a category, defaulting the color when none is given.
    ///
    /// # Errors
    /// - `RepoError::Validation` on a blank/oversize name or malformed color.
    pub fn create_category(
        &self,
        user: UserId,
        name: impl Into<String>,
        color: Option<String>,
    ) -> RepoResult<Category> {
        let category = Category::new(user, name, color);
        self.repo.create_category(&category)?;
        info!(
            "event=category_created module=categories status=ok user={user} category={}",
            category.uuid
        );
        Ok(category)
    }

    pub fn get_category(&self, id: CategoryId, user: UserId) -> RepoResult<Option<Category>> {
        self.repo.get_category(id, user)
    }

    /// The user's categories ordered by name.
    pub fn list_categories(&self, user: UserId) -> RepoResult<Vec<Category>> {
        self.repo.list_categories(user)
    }

    /// Applies a partial update, re-validating the changed fields.
    pub fn update_category(
        &self,
        id: CategoryId,
        user: UserId,
        patch: CategoryPatch,
    ) -> RepoResult<Option<Category>> {
        let Some(mut category) = self.repo.get_category(id, user)? else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            category.name = name;
        }
        if let Some(color) = patch.color {
            category.color = color;
        }

        self.repo.update_category(&category)?;
        Ok(Some(category))
    }

    /// Removes the category row; task references clear, tasks survive.
    pub fn delete_category(&self, id: CategoryId, user: UserId) -> RepoResult<bool> {
        let deleted = self.repo.delete_category(id, user)?;
        if deleted {
            info!("event=category_deleted module=categories status=ok user={user} category={id}");
        }
        Ok(deleted)
    }

    /// Task totals per category plus an uncategorized bucket.
    pub fn category_stats(&self, user: UserId) -> RepoResult<Vec<CategoryStat>> {
        self.repo.category_stats(user)
    }
}
