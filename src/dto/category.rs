use serde::{Deserialize, Serialize};

use super::bounded_text;
use crate::entities::category;
use crate::error::AppError;

// ============ Request DTOs ============

/// POST /categories - Create category request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// PUT /categories/{id} - Partial update
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl CreateCategoryRequest {
    /// # Errors
    ///
    /// Returns `VALIDATION_ERROR` on the first invalid field.
    pub fn validate(self) -> Result<Self, AppError> {
        Ok(Self {
            name: bounded_text("Name", &self.name, 1, 100)?,
            description: optional_text("Description", self.description, 500)?,
            icon: optional_text("Icon", self.icon, 50)?,
            sort_order: sort_order(self.sort_order)?,
            is_active: self.is_active,
        })
    }
}

impl UpdateCategoryRequest {
    /// # Errors
    ///
    /// Returns `VALIDATION_ERROR` on the first invalid field.
    pub fn validate(self) -> Result<Self, AppError> {
        Ok(Self {
            name: self
                .name
                .map(|n| bounded_text("Name", &n, 1, 100))
                .transpose()?,
            description: optional_text("Description", self.description, 500)?,
            icon: optional_text("Icon", self.icon, 50)?,
            sort_order: sort_order(self.sort_order)?,
            is_active: self.is_active,
        })
    }
}

fn optional_text(field: &str, value: Option<String>, max: usize) -> Result<Option<String>, AppError> {
    value.map(|v| bounded_text(field, &v, 0, max)).transpose()
}

fn sort_order(value: Option<i32>) -> Result<Option<i32>, AppError> {
    if value.is_some_and(|v| v < 0) {
        return Err(AppError::validation(
            "Sort order must be a non-negative integer",
        ));
    }
    Ok(value)
}

/// PATCH /categories/{id}/status
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStatusRequest {
    #[serde(default)]
    pub is_active: serde_json::Value,
}

/// POST /categories/reorder
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    #[serde(default)]
    pub category_orders: serde_json::Value,
}

/// One entry of a reorder request.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryOrder {
    pub id: i32,
    pub sort_order: i32,
}

// ============ Response DTOs ============

/// Category embedded in a game
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

impl From<category::Model> for CategorySummary {
    fn from(category: category::Model) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
        }
    }
}

/// Category with its derived game count
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
    pub game_count: u64,
}

impl CategoryResponse {
    #[must_use]
    pub fn new(category: category::Model, game_count: u64) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            icon: category.icon,
            sort_order: category.sort_order,
            is_active: category.is_active,
            created_at: category.created_at.to_rfc3339(),
            updated_at: category.updated_at.to_rfc3339(),
            game_count,
        }
    }
}

/// Staff mutation acknowledgement carrying the affected category
#[derive(Debug, Serialize)]
pub struct CategoryMutationResponse {
    pub message: String,
    pub category: CategoryResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_validation() {
        let ok = CreateCategoryRequest {
            name: " Puzzle ".to_string(),
            description: None,
            icon: Some("🧩".to_string()),
            sort_order: Some(2),
            is_active: None,
        }
        .validate();
        assert_eq!(ok.ok().map(|r| r.name), Some("Puzzle".to_string()));

        let negative = CreateCategoryRequest {
            name: "Puzzle".to_string(),
            description: None,
            icon: None,
            sort_order: Some(-1),
            is_active: None,
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_update_rejects_blank_name() {
        let update = UpdateCategoryRequest {
            name: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
