use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use super::games::count_in_category;
use super::{Identifier, parse_id};
use crate::auth::middleware::{StaffUser, Viewer};
use crate::catalog::query::visibility;
use crate::catalog::ranking::{self, SortMode};
use crate::catalog::{Audience, CategoryFilter, GameFilter, GameQuery, Page, PageMeta, slug};
use crate::dto::category::{
    CategoryMutationResponse, CategoryOrder, CategoryStatusRequest, CreateCategoryRequest,
    ReorderRequest, UpdateCategoryRequest,
};
use crate::dto::{CategoryResponse, GameResponse, MessageResponse};
use crate::entities::{category, game};
use crate::error::{AppError, json_body};
use crate::state::AppState;

const TOP_GAMES: usize = 5;

/// Category router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/reorder", post(reorder_categories))
        .route("/slug/{slug}", get(category_games))
        .route(
            "/{id}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .route("/{id}/status", patch(update_status))
        .route("/{id}/stats", get(category_stats))
}

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListCategoriesQuery {
    include_inactive: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CategoryGamesQuery {
    page: Option<String>,
    limit: Option<String>,
    sort: Option<String>,
}

#[derive(Debug, Serialize)]
struct CategoryGamesResponse {
    category: CategoryResponse,
    games: Vec<GameResponse>,
    pagination: PageMeta,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TopGame {
    id: i32,
    title: String,
    play_count: i64,
    rating: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryStats {
    total_games: u64,
    active_games: u64,
    total_plays: i64,
    average_rating: f64,
    top_games: Vec<TopGame>,
}

#[derive(Debug, Serialize)]
struct CategoryStatsResponse {
    category: CategoryResponse,
    stats: CategoryStats,
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /categories` — Categories ordered for navigation, with game counts.
///
/// Staff may pass `includeInactive=true`; staff counts include every game status.
async fn list_categories(
    State(state): State<AppState>,
    Viewer(audience): Viewer,
    Query(params): Query<ListCategoriesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let include_inactive =
        audience.is_staff() && params.include_inactive.as_deref() == Some("true");

    let mut select = category::Entity::find()
        .order_by_asc(category::Column::SortOrder)
        .order_by_asc(category::Column::Name);
    if !include_inactive {
        select = select.filter(category::Column::IsActive.eq(true));
    }
    let categories = select.all(&state.db).await?;

    let counts: HashMap<i32, i64> = game::Entity::find()
        .select_only()
        .column(game::Column::CategoryId)
        .column_as(game::Column::Id.count(), "game_count")
        .filter(visibility(audience))
        .group_by(game::Column::CategoryId)
        .into_tuple::<(i32, i64)>()
        .all(&state.db)
        .await?
        .into_iter()
        .collect();

    let response: Vec<CategoryResponse> = categories
        .into_iter()
        .map(|c| {
            let count = counts.get(&c.id).copied().unwrap_or_default();
            CategoryResponse::new(c, u64::try_from(count).unwrap_or_default())
        })
        .collect();

    Ok(Json(response))
}

/// `GET /categories/{id}` — An active category by numeric id or slug.
async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let category = find_active_category(&state.db, &Identifier::parse(&id)).await?;
    let count = count_in_category(&state.db, category.id, Audience::Public).await?;
    Ok(Json(CategoryResponse::new(category, count)))
}

/// `GET /categories/slug/{slug}` — An active category with a page of its active games.
async fn category_games(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<CategoryGamesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let category = find_active_category(&state.db, &Identifier::Slug(slug)).await?;
    let page = Page::lenient(params.page.as_deref(), params.limit.as_deref());

    let query = GameQuery {
        filter: GameFilter {
            category: Some(CategoryFilter::Ids(vec![category.id])),
            ..Default::default()
        },
        audience: Audience::Public,
        sort: SortMode::parse(params.sort.as_deref(), SortMode::Popular),
        page,
    };
    let result = query.fetch(&state.db).await?;

    Ok(Json(CategoryGamesResponse {
        category: CategoryResponse::new(category, result.total),
        games: GameResponse::from_rows(result.rows),
        pagination: page.meta(result.total),
    }))
}

/// `POST /categories` — Create a category (staff only).
async fn create_category(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    payload: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = json_body(payload)?.validate()?;
    let slug = slug::unique_category_slug(&state.db, &req.name, None).await?;
    let now = chrono::Utc::now();

    let category = category::ActiveModel {
        name: ActiveValue::Set(req.name),
        slug: ActiveValue::Set(slug),
        description: ActiveValue::Set(req.description.filter(|d| !d.is_empty())),
        icon: ActiveValue::Set(req.icon.filter(|i| !i.is_empty())),
        sort_order: ActiveValue::Set(req.sort_order.unwrap_or_default()),
        is_active: ActiveValue::Set(req.is_active.unwrap_or(true)),
        created_at: ActiveValue::Set(now.into()),
        updated_at: ActiveValue::Set(now.into()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(category_id = category.id, slug = %category.slug, staff = %staff.sub, "Category created");

    Ok((
        StatusCode::CREATED,
        Json(CategoryMutationResponse {
            message: "Category created successfully".to_string(),
            category: CategoryResponse::new(category, 0),
        }),
    ))
}

/// `PUT /categories/{id}` — Update a category (staff only). Renaming regenerates the slug.
async fn update_category(
    State(state): State<AppState>,
    StaffUser(_): StaffUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateCategoryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let req = json_body(payload)?.validate()?;
    let existing = find_category(&state.db, id).await?;

    let mut active: category::ActiveModel = existing.clone().into();
    if let Some(name) = req.name {
        if name != existing.name {
            let slug = slug::unique_category_slug(&state.db, &name, Some(id)).await?;
            active.slug = ActiveValue::Set(slug);
        }
        active.name = ActiveValue::Set(name);
    }
    if let Some(description) = req.description {
        active.description = ActiveValue::Set(Some(description).filter(|d| !d.is_empty()));
    }
    if let Some(icon) = req.icon {
        active.icon = ActiveValue::Set(Some(icon).filter(|i| !i.is_empty()));
    }
    if let Some(sort_order) = req.sort_order {
        active.sort_order = ActiveValue::Set(sort_order);
    }
    if let Some(is_active) = req.is_active {
        active.is_active = ActiveValue::Set(is_active);
    }
    active.updated_at = ActiveValue::Set(chrono::Utc::now().into());

    let category = active.update(&state.db).await?;
    let count = count_in_category(&state.db, category.id, Audience::Staff).await?;

    Ok(Json(CategoryMutationResponse {
        message: "Category updated successfully".to_string(),
        category: CategoryResponse::new(category, count),
    }))
}

/// `DELETE /categories/{id}` — Delete an empty category (staff only).
async fn delete_category(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let category = find_category(&state.db, id).await?;

    let games = count_in_category(&state.db, category.id, Audience::Staff).await?;
    if games > 0 {
        return Err(AppError::Rejected(
            "CATEGORY_HAS_GAMES",
            "Cannot delete category with existing games".to_string(),
        ));
    }

    category::Entity::delete_by_id(category.id)
        .exec(&state.db)
        .await?;
    tracing::info!(category_id = id, staff = %staff.sub, "Category deleted");

    Ok(Json(MessageResponse::new("Category deleted successfully")))
}

/// `PATCH /categories/{id}/status` — Activate or deactivate a category (staff only).
async fn update_status(
    State(state): State<AppState>,
    StaffUser(_): StaffUser,
    Path(id): Path<String>,
    payload: Result<Json<CategoryStatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let is_active = json_body(payload)?.is_active.as_bool().ok_or_else(|| {
        AppError::Rejected("INVALID_STATUS", "isActive must be a boolean".to_string())
    })?;

    let mut active: category::ActiveModel = find_category(&state.db, id).await?.into();
    active.is_active = ActiveValue::Set(is_active);
    active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
    let category = active.update(&state.db).await?;
    let count = count_in_category(&state.db, category.id, Audience::Staff).await?;

    Ok(Json(CategoryMutationResponse {
        message: "Category status updated successfully".to_string(),
        category: CategoryResponse::new(category, count),
    }))
}

/// `POST /categories/reorder` — Set many sort orders at once (staff only).
///
/// Applied atomically: an unknown id leaves every category unchanged.
async fn reorder_categories(
    State(state): State<AppState>,
    StaffUser(_): StaffUser,
    payload: Result<Json<ReorderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let orders: Vec<CategoryOrder> = serde_json::from_value(json_body(payload)?.category_orders)
        .map_err(|_| {
            AppError::Rejected(
                "INVALID_ORDER_DATA",
                "categoryOrders must be an array of { id, sortOrder }".to_string(),
            )
        })?;

    let txn = state.db.begin().await?;
    let now = chrono::Utc::now();
    for order in &orders {
        let existing = category::Entity::find_by_id(order.id)
            .one(&txn)
            .await?
            .ok_or_else(category_not_found)?;
        let mut active: category::ActiveModel = existing.into();
        active.sort_order = ActiveValue::Set(order.sort_order);
        active.updated_at = ActiveValue::Set(now.into());
        active.update(&txn).await?;
    }
    txn.commit().await?;

    tracing::info!(count = orders.len(), "Categories reordered");
    Ok(Json(MessageResponse::new("Categories reordered successfully")))
}

/// `GET /categories/{id}/stats` — Game totals for one category (staff only).
async fn category_stats(
    State(state): State<AppState>,
    StaffUser(_): StaffUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let category = find_category(&state.db, id).await?;

    let mut games = game::Entity::find()
        .filter(game::Column::CategoryId.eq(id))
        .all(&state.db)
        .await?;
    let figures: Vec<(String, i64, Option<f64>)> = games
        .iter()
        .map(|g| (g.status.clone(), g.play_count, g.rating))
        .collect();

    ranking::sort_games(&mut games, &SortMode::Popular.keys());
    let top_games = games
        .into_iter()
        .take(TOP_GAMES)
        .map(|g| TopGame {
            id: g.id,
            title: g.title,
            play_count: g.play_count,
            rating: g.rating,
        })
        .collect();

    let stats = summarize(&figures, top_games);
    Ok(Json(CategoryStatsResponse {
        category: CategoryResponse::new(category, stats.total_games),
        stats,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn category_not_found() -> AppError {
    AppError::NotFound("CATEGORY_NOT_FOUND", "Category not found".to_string())
}

async fn find_category(db: &DatabaseConnection, id: i32) -> Result<category::Model, AppError> {
    category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(category_not_found)
}

async fn find_active_category(
    db: &DatabaseConnection,
    identifier: &Identifier,
) -> Result<category::Model, AppError> {
    let select = category::Entity::find().filter(category::Column::IsActive.eq(true));
    let select = match identifier {
        Identifier::Id(id) => select.filter(category::Column::Id.eq(*id)),
        Identifier::Slug(slug) => select.filter(category::Column::Slug.eq(slug.as_str())),
    };
    select.one(db).await?.ok_or_else(category_not_found)
}

/// Fold `(status, play_count, rating)` rows into category totals.
#[allow(clippy::cast_precision_loss)]
fn summarize(figures: &[(String, i64, Option<f64>)], top_games: Vec<TopGame>) -> CategoryStats {
    let active = figures
        .iter()
        .filter(|(status, _, _)| status == crate::entities::GameStatus::Active.as_str())
        .count();
    let ratings: Vec<f64> = figures.iter().filter_map(|(_, _, rating)| *rating).collect();
    let average_rating = if ratings.is_empty() {
        0.0
    } else {
        ratings.iter().sum::<f64>() / ratings.len() as f64
    };

    CategoryStats {
        total_games: figures.len() as u64,
        active_games: active as u64,
        total_plays: figures.iter().map(|(_, plays, _)| *plays).sum(),
        average_rating,
        top_games,
    }
}
