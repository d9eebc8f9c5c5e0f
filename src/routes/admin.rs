use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::Serialize;

use crate::auth::middleware::StaffUser;
use crate::catalog::ranking::{self, SortMode};
use crate::catalog::trending::WINDOW_DAYS;
use crate::dto::GameResponse;
use crate::entities::{category, game, search_query};
use crate::error::AppError;
use crate::state::AppState;

const RECENT_GAMES: u64 = 5;
const TOP_GAMES: u64 = 10;

/// Staff dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/stats", get(dashboard_stats))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Totals {
    games: u64,
    active_games: u64,
    categories: u64,
    plays: i64,
    views: i64,
    /// Searches logged within the trending window
    recent_searches: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardResponse {
    totals: Totals,
    recent_games: Vec<GameResponse>,
    top_games: Vec<GameResponse>,
}

/// `GET /admin/stats` — Catalog-wide totals plus newest and most played games.
async fn dashboard_stats(
    State(state): State<AppState>,
    StaffUser(_): StaffUser,
) -> Result<impl IntoResponse, AppError> {
    let db = &state.db;

    let counters: Vec<(String, i64, i64)> = game::Entity::find()
        .select_only()
        .column(game::Column::Status)
        .column(game::Column::PlayCount)
        .column(game::Column::Views)
        .into_tuple()
        .all(db)
        .await?;

    let categories = category::Entity::find().count(db).await?;
    let since: DateTime<FixedOffset> = (Utc::now() - Duration::days(WINDOW_DAYS)).into();
    let recent_searches = search_query::Entity::find()
        .filter(search_query::Column::CreatedAt.gte(since))
        .count(db)
        .await?;

    let recent_games = game::Entity::find()
        .find_also_related(category::Entity)
        .order_by_desc(game::Column::CreatedAt)
        .order_by_asc(game::Column::Id)
        .limit(RECENT_GAMES)
        .all(db)
        .await?;

    let top_games = ranking::apply(
        game::Entity::find().find_also_related(category::Entity),
        &SortMode::Popular.keys(),
    )
    .limit(TOP_GAMES)
    .all(db)
    .await?;

    Ok(Json(DashboardResponse {
        totals: totals(&counters, categories, recent_searches),
        recent_games: GameResponse::from_rows(recent_games),
        top_games: GameResponse::from_rows(top_games),
    }))
}

/// Fold `(status, play_count, views)` rows into dashboard totals.
fn totals(counters: &[(String, i64, i64)], categories: u64, recent_searches: u64) -> Totals {
    let active = counters
        .iter()
        .filter(|(status, _, _)| status == crate::entities::GameStatus::Active.as_str())
        .count();

    Totals {
        games: counters.len() as u64,
        active_games: active as u64,
        categories,
        plays: counters.iter().map(|(_, plays, _)| *plays).sum(),
        views: counters.iter().map(|(_, _, views)| *views).sum(),
        recent_searches,
    }
}
