//! Task category domain model.

use crate::model::user::UserId;
use crate::model::{now_epoch_ms, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum category name length in characters.
pub const CATEGORY_NAME_MAX_CHARS: usize = 50;

/// Color assigned when the caller does not pick one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#808080";

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid hex color regex"));

/// Stable identifier for a category.
pub type CategoryId = Uuid;

/// A user-defined grouping label for tasks, independent of task lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub uuid: CategoryId,
    /// Owning user. Ownership is checked on every operation.
    pub user_uuid: UserId,
    pub name: String,
    /// Display color in `#RRGGBB` form.
    pub color: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

impl Category {
    /// Creates a category, defaulting the color when none is given.
    pub fn new(user_uuid: UserId, name: impl Into<String>, color: Option<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            user_uuid,
            name: name.into(),
            color: color.unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
            created_at: now_epoch_ms(),
        }
    }

    /// Checks caller-supplied field constraints.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_category_name(&self.name)?;
        validate_color(&self.color)
    }
}

/// Validates a category name against length and emptiness constraints.
pub fn validate_category_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyCategoryName);
    }
    let length = name.chars().count();
    if length > CATEGORY_NAME_MAX_CHARS {
        return Err(ValidationError::CategoryNameTooLong { length });
    }
    Ok(())
}

/// Validates a `#RRGGBB` color string.
pub fn validate_color(color: &str) -> Result<(), ValidationError> {
    if HEX_COLOR_RE.is_match(color) {
        Ok(())
    } else {
        Err(ValidationError::InvalidColor(color.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_category_name, validate_color, Category, CATEGORY_NAME_MAX_CHARS};
    use crate::model::ValidationError;
    use uuid::Uuid;

    #[test]
    fn default_color_applies_when_unset() {
        let category = Category::new(Uuid::new_v4(), "work", None);
        assert_eq!(category.color, "#808080");
        assert!(category.validate().is_ok());
    }

    #[test]
    fn color_validation_requires_rrggbb() {
        assert!(validate_color("#1a2B3c").is_ok());
        for bad in ["808080", "#80808", "#80808g", "#8080800", "red"] {
            assert!(matches!(
                validate_color(bad),
                Err(ValidationError::InvalidColor(_))
            ));
        }
    }

    #[test]
    fn name_validation_rejects_blank_and_oversize() {
        assert_eq!(
            validate_category_name(" "),
            Err(ValidationError::EmptyCategoryName)
        );
        let oversize = "c".repeat(CATEGORY_NAME_MAX_CHARS + 1);
        assert!(matches!(
            validate_category_name(&oversize),
            Err(ValidationError::CategoryNameTooLong { .. })
        ));
    }
}
