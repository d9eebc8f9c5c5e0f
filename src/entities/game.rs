use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::GameStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "game")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub description: String,
    pub long_description: Option<String>,
    pub thumbnail: String,
    /// JSON array of screenshot URLs, in display order.
    pub screenshots: String,
    pub category_id: i32,
    /// JSON array of tag strings.
    pub tags: String,
    pub play_count: i64,
    pub views: i64,
    pub rating: Option<f64>,
    pub review_count: i64,
    pub developer: Option<String>,
    pub file_url: Option<String>,
    pub game_url: Option<String>,
    pub is_featured: bool,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "Restrict"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decoded tag list. Malformed JSON reads as no tags.
    #[must_use]
    pub fn tag_list(&self) -> Vec<String> {
        serde_json::from_str(&self.tags).unwrap_or_default()
    }

    /// Decoded screenshot URLs. Malformed JSON reads as no screenshots.
    #[must_use]
    pub fn screenshot_list(&self) -> Vec<String> {
        serde_json::from_str(&self.screenshots).unwrap_or_default()
    }

    /// Parsed status; unknown values are treated as inactive.
    #[must_use]
    pub fn status(&self) -> GameStatus {
        GameStatus::from_str(&self.status).unwrap_or(GameStatus::Inactive)
    }
}

/// Encode a string list for the JSON text columns (`tags`, `screenshots`).
#[must_use]
pub fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}
