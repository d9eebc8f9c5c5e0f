use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QuerySelect,
};
use serde::{Deserialize, Serialize};

use super::{Identifier, parse_id};
use crate::auth::middleware::{StaffUser, Viewer};
use crate::catalog::counters::{self, GameCounter};
use crate::catalog::pagination::MAX_LIMIT;
use crate::catalog::query::visibility;
use crate::catalog::ranking::{self, SortField, SortKey};
use crate::catalog::{
    Audience, CategoryFilter, GameFilter, GameQuery, Page, PageMeta, SortMode, best_effort, slug,
};
use crate::dto::game::{
    BulkAction, BulkGameRequest, BulkResponse, CreateGameRequest, GameMutationResponse,
    UpdateGameRequest, UpdateStatusRequest,
};
use crate::dto::{GameResponse, MessageResponse};
use crate::entities::{GameStatus, category, game};
use crate::error::{AppError, json_body};
use crate::state::AppState;

const DEFAULT_RELATED: u64 = 4;

/// Game catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_games).post(create_game))
        .route("/bulk", post(bulk_update))
        .route(
            "/{id}",
            get(get_game).put(update_game).delete(delete_game),
        )
        .route("/{id}/play", post(record_play))
        .route("/{id}/related", get(related_games))
        .route("/{id}/status", axum::routing::patch(update_status))
}

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListGamesQuery {
    page: Option<String>,
    limit: Option<String>,
    /// Category slug
    category: Option<String>,
    search: Option<String>,
    sort: Option<String>,
    featured: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RelatedQuery {
    limit: Option<String>,
}

#[derive(Debug, Serialize)]
struct GameListResponse {
    games: Vec<GameResponse>,
    pagination: PageMeta,
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /games` — Paginated catalog listing. Staff also see non-active games.
async fn list_games(
    State(state): State<AppState>,
    Viewer(audience): Viewer,
    Query(params): Query<ListGamesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = Page::validated(params.page.as_deref(), params.limit.as_deref())?;

    let query = GameQuery {
        filter: GameFilter {
            text: params
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            category: params
                .category
                .filter(|c| !c.is_empty())
                .map(CategoryFilter::Slug),
            featured_only: params.featured.as_deref() == Some("true"),
            ..Default::default()
        },
        audience,
        sort: SortMode::parse(params.sort.as_deref(), SortMode::Popular),
        page,
    };

    let result = query.fetch(&state.db).await?;

    Ok(Json(GameListResponse {
        games: GameResponse::from_rows(result.rows),
        pagination: page.meta(result.total),
    }))
}

/// `GET /games/{id}` — Get a game by numeric id or slug, counting a view.
async fn get_game(
    State(state): State<AppState>,
    Viewer(audience): Viewer,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (game, category) = find_game(&state.db, &Identifier::parse(&id), audience).await?;

    best_effort(
        "increment game views",
        counters::bump_game(&state.db, game.id, GameCounter::Views),
    )
    .await;

    Ok(Json(GameResponse::new(game, category)))
}

/// `POST /games/{id}/play` — Count a play of an active game.
async fn record_play(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    find_game(&state.db, &Identifier::Id(id), Audience::Public).await?;

    counters::bump_game(&state.db, id, GameCounter::Plays).await?;
    tracing::debug!(game_id = id, "Play recorded");

    Ok(Json(MessageResponse::new("Play count updated")))
}

/// `GET /games/{id}/related` — Other active games from the same category.
async fn related_games(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<RelatedQuery>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let limit = params
        .limit
        .and_then(|l| l.trim().parse::<u64>().ok())
        .filter(|l| *l >= 1)
        .unwrap_or(DEFAULT_RELATED)
        .min(MAX_LIMIT);

    let (game, _) = find_game(&state.db, &Identifier::Id(id), Audience::Public).await?;

    let keys = [
        SortKey::desc(SortField::Rating),
        SortKey::desc(SortField::PlayCount),
        SortKey::asc(SortField::Id),
    ];
    let rows = ranking::apply(
        game::Entity::find()
            .filter(visibility(Audience::Public))
            .filter(game::Column::Id.ne(game.id))
            .filter(game::Column::CategoryId.eq(game.category_id))
            .find_also_related(category::Entity),
        &keys,
    )
    .limit(limit)
    .all(&state.db)
    .await?;

    Ok(Json(GameResponse::from_rows(rows)))
}

/// `POST /games` — Create a game (staff only).
async fn create_game(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    payload: Result<Json<CreateGameRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = json_body(payload)?.validate()?;
    let category = require_category(&state.db, req.category_id).await?;

    let slug = slug::unique_game_slug(&state.db, &req.title, None).await?;
    let now = chrono::Utc::now();

    let game = game::ActiveModel {
        title: ActiveValue::Set(req.title),
        slug: ActiveValue::Set(slug),
        description: ActiveValue::Set(req.description),
        long_description: ActiveValue::Set(req.long_description),
        thumbnail: ActiveValue::Set(req.thumbnail),
        screenshots: ActiveValue::Set(game::encode_list(&req.screenshots)),
        category_id: ActiveValue::Set(req.category_id),
        tags: ActiveValue::Set(game::encode_list(&req.tags)),
        play_count: ActiveValue::Set(0),
        views: ActiveValue::Set(0),
        rating: ActiveValue::Set(req.rating),
        review_count: ActiveValue::Set(0),
        developer: ActiveValue::Set(req.developer),
        file_url: ActiveValue::Set(req.file_url),
        game_url: ActiveValue::Set(req.game_url),
        is_featured: ActiveValue::Set(req.is_featured),
        status: ActiveValue::Set(GameStatus::Active.as_str().to_string()),
        created_at: ActiveValue::Set(now.into()),
        updated_at: ActiveValue::Set(now.into()),
        ..Default::default()
    };

    let game = game.insert(&state.db).await?;
    tracing::info!(game_id = game.id, slug = %game.slug, staff = %staff.sub, "Game created");

    Ok((
        StatusCode::CREATED,
        Json(GameMutationResponse {
            message: "Game created successfully".to_string(),
            game: GameResponse::new(game, Some(category)),
        }),
    ))
}

/// `PUT /games/{id}` — Update a game (staff only). Renaming regenerates the slug.
async fn update_game(
    State(state): State<AppState>,
    StaffUser(_): StaffUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateGameRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let req = json_body(payload)?.validate()?;

    let existing = game::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(game_not_found)?;

    let mut active: game::ActiveModel = existing.clone().into();

    if let Some(title) = req.title {
        if title != existing.title {
            let slug = slug::unique_game_slug(&state.db, &title, Some(id)).await?;
            active.slug = ActiveValue::Set(slug);
        }
        active.title = ActiveValue::Set(title);
    }
    if let Some(raw) = req.category_id {
        let category_id = i32::try_from(raw)
            .map_err(|_| AppError::validation("Category ID must be a positive integer"))?;
        require_category(&state.db, category_id).await?;
        active.category_id = ActiveValue::Set(category_id);
    }
    if let Some(description) = req.description {
        active.description = ActiveValue::Set(description);
    }
    if let Some(long_description) = req.long_description {
        active.long_description = ActiveValue::Set(Some(long_description));
    }
    if let Some(thumbnail) = req.thumbnail {
        active.thumbnail = ActiveValue::Set(thumbnail);
    }
    if let Some(screenshots) = req.screenshots {
        active.screenshots = ActiveValue::Set(game::encode_list(&screenshots));
    }
    if let Some(tags) = req.tags {
        active.tags = ActiveValue::Set(game::encode_list(&tags));
    }
    if let Some(developer) = req.developer {
        active.developer = ActiveValue::Set(Some(developer));
    }
    if let Some(file_url) = req.file_url {
        active.file_url = ActiveValue::Set(Some(file_url));
    }
    if let Some(game_url) = req.game_url {
        active.game_url = ActiveValue::Set(Some(game_url));
    }
    if let Some(rating) = req.rating {
        active.rating = ActiveValue::Set(Some(rating));
    }
    if let Some(review_count) = req.review_count {
        active.review_count = ActiveValue::Set(review_count);
    }
    if let Some(is_featured) = req.is_featured {
        active.is_featured = ActiveValue::Set(is_featured);
    }
    active.updated_at = ActiveValue::Set(chrono::Utc::now().into());

    let game = active.update(&state.db).await?;
    let category = category::Entity::find_by_id(game.category_id)
        .one(&state.db)
        .await?;

    Ok(Json(GameMutationResponse {
        message: "Game updated successfully".to_string(),
        game: GameResponse::new(game, category),
    }))
}

/// `DELETE /games/{id}` — Permanently delete a game (staff only).
async fn delete_game(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let result = game::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(game_not_found());
    }
    tracing::info!(game_id = id, staff = %staff.sub, "Game deleted");

    Ok(Json(MessageResponse::new("Game deleted successfully")))
}

/// `PATCH /games/{id}/status` — Change a game's status (staff only).
///
/// Moving a game to `FEATURED` also flags it as featured.
async fn update_status(
    State(state): State<AppState>,
    StaffUser(_): StaffUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let req = json_body(payload)?;
    let status = GameStatus::from_str(&req.status)
        .ok_or_else(|| AppError::Rejected("INVALID_STATUS", "Invalid status".to_string()))?;

    let existing = game::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(game_not_found)?;

    let mut active: game::ActiveModel = existing.into();
    active.status = ActiveValue::Set(status.as_str().to_string());
    if status == GameStatus::Featured {
        active.is_featured = ActiveValue::Set(true);
    }
    active.updated_at = ActiveValue::Set(chrono::Utc::now().into());

    let game = active.update(&state.db).await?;
    let category = category::Entity::find_by_id(game.category_id)
        .one(&state.db)
        .await?;

    Ok(Json(GameMutationResponse {
        message: "Game status updated successfully".to_string(),
        game: GameResponse::new(game, category),
    }))
}

/// `POST /games/bulk` — Apply one action to many games (staff only).
async fn bulk_update(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    payload: Result<Json<BulkGameRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = json_body(payload)?;
    if req.game_ids.is_empty() {
        return Err(AppError::Rejected(
            "MISSING_IDS",
            "Game IDs are required".to_string(),
        ));
    }
    let action = BulkAction::parse(&req.action).ok_or_else(|| {
        AppError::Rejected("INVALID_BULK_ACTION", "Invalid bulk action".to_string())
    })?;

    let targets = game::Column::Id.is_in(req.game_ids.iter().copied());
    let now: chrono::DateTime<chrono::FixedOffset> = chrono::Utc::now().into();

    let affected = match action {
        BulkAction::Delete => {
            game::Entity::delete_many()
                .filter(targets)
                .exec(&state.db)
                .await?
                .rows_affected
        }
        BulkAction::Activate | BulkAction::Deactivate => {
            let status = if action == BulkAction::Activate {
                GameStatus::Active
            } else {
                GameStatus::Inactive
            };
            game::Entity::update_many()
                .col_expr(game::Column::Status, Expr::value(status.as_str()))
                .col_expr(game::Column::UpdatedAt, Expr::value(now))
                .filter(targets)
                .exec(&state.db)
                .await?
                .rows_affected
        }
        BulkAction::Feature => {
            game::Entity::update_many()
                .col_expr(
                    game::Column::Status,
                    Expr::value(GameStatus::Featured.as_str()),
                )
                .col_expr(game::Column::IsFeatured, Expr::value(true))
                .col_expr(game::Column::UpdatedAt, Expr::value(now))
                .filter(targets)
                .exec(&state.db)
                .await?
                .rows_affected
        }
    };

    tracing::info!(action = action.as_str(), affected, staff = %staff.sub, "Bulk game update");

    Ok(Json(BulkResponse {
        message: format!("Bulk {} completed successfully", action.as_str()),
        affected,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn game_not_found() -> AppError {
    AppError::NotFound("GAME_NOT_FOUND", "Game not found".to_string())
}

/// Load a game visible to `audience`, with its category.
async fn find_game(
    db: &DatabaseConnection,
    identifier: &Identifier,
    audience: Audience,
) -> Result<(game::Model, Option<category::Model>), AppError> {
    let select = game::Entity::find().filter(visibility(audience));
    let select = match identifier {
        Identifier::Id(id) => select.filter(game::Column::Id.eq(*id)),
        Identifier::Slug(slug) => select.filter(game::Column::Slug.eq(slug.as_str())),
    };

    select
        .find_also_related(category::Entity)
        .one(db)
        .await?
        .ok_or_else(game_not_found)
}

/// The category a game is being attached to; it must exist.
async fn require_category(
    db: &DatabaseConnection,
    category_id: i32,
) -> Result<category::Model, AppError> {
    category::Entity::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::validation("Category ID does not match an existing category"))
}

/// Number of games in `category_id`, optionally only those the public can see.
pub(super) async fn count_in_category(
    db: &DatabaseConnection,
    category_id: i32,
    audience: Audience,
) -> Result<u64, AppError> {
    Ok(game::Entity::find()
        .filter(visibility(audience))
        .filter(game::Column::CategoryId.eq(category_id))
        .count(db)
        .await?)
}
