use serde::{Deserialize, Serialize};

use super::{CategorySummary, bounded_text, http_url, rating_bound};
use crate::entities::{category, game};
use crate::error::AppError;

// ============ Request DTOs ============

/// POST /games - Create game request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    pub thumbnail: String,
    #[serde(default)]
    pub screenshots: Vec<String>,
    pub category_id: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    pub developer: Option<String>,
    pub file_url: Option<String>,
    pub game_url: Option<String>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub is_featured: bool,
}

/// A create request that passed field validation.
#[derive(Debug, Clone)]
pub struct NewGame {
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    pub thumbnail: String,
    pub screenshots: Vec<String>,
    pub category_id: i32,
    pub tags: Vec<String>,
    pub developer: Option<String>,
    pub file_url: Option<String>,
    pub game_url: Option<String>,
    pub rating: Option<f64>,
    pub is_featured: bool,
}

impl CreateGameRequest {
    /// Check every field. Category existence is checked by the handler.
    ///
    /// # Errors
    ///
    /// Returns `VALIDATION_ERROR` on the first invalid field.
    pub fn validate(self) -> Result<NewGame, AppError> {
        Ok(NewGame {
            title: bounded_text("Title", &self.title, 1, 200)?,
            description: bounded_text("Description", &self.description, 10, 1000)?,
            long_description: self.long_description,
            thumbnail: http_url("Thumbnail", &self.thumbnail)?,
            screenshots: self
                .screenshots
                .iter()
                .map(|s| http_url("Screenshot", s))
                .collect::<Result<_, _>>()?,
            category_id: category_id(self.category_id)?,
            tags: clean_tags(self.tags),
            developer: optional_developer(self.developer)?,
            file_url: self.file_url.map(|u| http_url("File URL", &u)).transpose()?,
            game_url: self.game_url.map(|u| http_url("Game URL", &u)).transpose()?,
            rating: self.rating.map(|r| rating_bound("Rating", r)).transpose()?,
            is_featured: self.is_featured,
        })
    }
}

/// PUT /games/{id} - Partial update; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGameRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub thumbnail: Option<String>,
    pub screenshots: Option<Vec<String>>,
    pub category_id: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub developer: Option<String>,
    pub file_url: Option<String>,
    pub game_url: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<i64>,
    pub is_featured: Option<bool>,
}

impl UpdateGameRequest {
    /// Check the fields that are present, normalising them in place.
    ///
    /// # Errors
    ///
    /// Returns `VALIDATION_ERROR` on the first invalid field.
    pub fn validate(mut self) -> Result<Self, AppError> {
        self.title = self
            .title
            .map(|t| bounded_text("Title", &t, 1, 200))
            .transpose()?;
        self.description = self
            .description
            .map(|d| bounded_text("Description", &d, 10, 1000))
            .transpose()?;
        self.thumbnail = self
            .thumbnail
            .map(|u| http_url("Thumbnail", &u))
            .transpose()?;
        self.screenshots = self
            .screenshots
            .map(|list| {
                list.iter()
                    .map(|s| http_url("Screenshot", s))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        if let Some(id) = self.category_id {
            category_id(id)?;
        }
        self.tags = self.tags.map(clean_tags);
        self.developer = optional_developer(self.developer)?;
        self.file_url = self.file_url.map(|u| http_url("File URL", &u)).transpose()?;
        self.game_url = self.game_url.map(|u| http_url("Game URL", &u)).transpose()?;
        self.rating = self.rating.map(|r| rating_bound("Rating", r)).transpose()?;
        if self.review_count.is_some_and(|c| c < 0) {
            return Err(AppError::validation("Review count must not be negative"));
        }
        Ok(self)
    }
}

/// PATCH /games/{id}/status
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// POST /games/bulk
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkGameRequest {
    pub action: String,
    #[serde(default)]
    pub game_ids: Vec<i32>,
}

/// Bulk operation applied to a set of games.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Delete,
    Activate,
    Deactivate,
    Feature,
}

impl BulkAction {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "delete" => Some(Self::Delete),
            "activate" => Some(Self::Activate),
            "deactivate" => Some(Self::Deactivate),
            "feature" => Some(Self::Feature),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Feature => "feature",
        }
    }
}

fn category_id(raw: i64) -> Result<i32, AppError> {
    i32::try_from(raw)
        .ok()
        .filter(|id| *id >= 1)
        .ok_or_else(|| AppError::validation("Category ID must be a positive integer"))
}

fn optional_developer(developer: Option<String>) -> Result<Option<String>, AppError> {
    developer
        .map(|d| bounded_text("Developer name", &d, 0, 100))
        .transpose()
        .map(|d| d.filter(|d| !d.is_empty()))
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !cleaned.contains(&tag) {
            cleaned.push(tag);
        }
    }
    cleaned
}

// ============ Response DTOs ============

/// Game as returned by every catalog endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub long_description: Option<String>,
    pub thumbnail: String,
    pub screenshots: Vec<String>,
    pub category_id: i32,
    pub tags: Vec<String>,
    pub play_count: i64,
    pub views: i64,
    pub rating: Option<f64>,
    pub review_count: i64,
    pub developer: Option<String>,
    pub file_url: Option<String>,
    pub game_url: Option<String>,
    pub is_featured: bool,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategorySummary>,
}

impl GameResponse {
    #[must_use]
    pub fn new(game: game::Model, category: Option<category::Model>) -> Self {
        let tags = game.tag_list();
        let screenshots = game.screenshot_list();
        Self {
            id: game.id,
            title: game.title,
            slug: game.slug,
            description: game.description,
            long_description: game.long_description,
            thumbnail: game.thumbnail,
            screenshots,
            category_id: game.category_id,
            tags,
            play_count: game.play_count,
            views: game.views,
            rating: game.rating,
            review_count: game.review_count,
            developer: game.developer,
            file_url: game.file_url,
            game_url: game.game_url,
            is_featured: game.is_featured,
            status: game.status,
            created_at: game.created_at.to_rfc3339(),
            updated_at: game.updated_at.to_rfc3339(),
            category: category.map(CategorySummary::from),
        }
    }

    /// Convert `(game, category)` rows as loaded by `find_also_related`.
    #[must_use]
    pub fn from_rows(rows: Vec<(game::Model, Option<category::Model>)>) -> Vec<Self> {
        rows.into_iter()
            .map(|(game, category)| Self::new(game, category))
            .collect()
    }
}

/// Staff mutation acknowledgement carrying the affected game
#[derive(Debug, Serialize)]
pub struct GameMutationResponse {
    pub message: String,
    pub game: GameResponse,
}

/// POST /games/bulk result
#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub message: String,
    pub affected: u64,
}
