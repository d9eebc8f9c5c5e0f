use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::middleware::Viewer;
use crate::auth::{extract_client_ip, extract_user_agent};
use crate::catalog::{
    CategoryFilter, GameFilter, GameQuery, Page, PageMeta, SortMode, best_effort, suggest,
    trending,
};
use crate::dto::{GameResponse, rating_bound};
use crate::error::{AppError, json_body};
use crate::state::AppState;

const MAX_QUERY_LEN: usize = 255;

/// Search router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_games))
        .route("/suggestions", get(suggestions))
        .route("/trending", get(trending_searches))
        .route("/advanced", post(advanced_search))
}

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchParams {
    q: Option<String>,
    category: Option<String>,
    min_rating: Option<String>,
    sort_by: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SuggestionParams {
    q: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrendingParams {
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdvancedSearchRequest {
    query: Option<String>,
    categories: Option<Vec<i32>>,
    min_rating: Option<f64>,
    max_rating: Option<f64>,
    min_play_count: Option<i64>,
    tags: Option<Vec<String>>,
    developer: Option<String>,
    featured: Option<bool>,
    sort_by: Option<String>,
    page: Option<i64>,
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchInfo {
    query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<Vec<i32>>,
    min_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_play_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    developer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    featured: Option<bool>,
    sort_by: &'static str,
    /// Server-side processing time in milliseconds
    execution_time: u128,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    games: Vec<GameResponse>,
    /// "Did you mean" titles; only filled when nothing matched
    suggestions: Vec<String>,
    total: u64,
    pagination: PageMeta,
    search_info: SearchInfo,
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /search` — Free-text search. Every call is logged for trending.
async fn search_games(
    State(state): State<AppState>,
    Viewer(audience): Viewer,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let started = Instant::now();

    let q = params.q.as_deref().map(str::trim).unwrap_or_default();
    let q_len = q.chars().count();
    if q_len == 0 || q_len > MAX_QUERY_LEN {
        return Err(AppError::validation(format!(
            "Search query must be between 1 and {MAX_QUERY_LEN} characters"
        )));
    }
    let category_id = params
        .category
        .as_deref()
        .map(|raw| {
            raw.trim()
                .parse::<i32>()
                .ok()
                .filter(|id| *id >= 1)
                .ok_or_else(|| AppError::validation("Category must be a positive integer"))
        })
        .transpose()?;
    let min_rating = params
        .min_rating
        .as_deref()
        .map(|raw| {
            raw.trim()
                .parse::<f64>()
                .map_err(|_| AppError::validation("Minimum rating must be between 0 and 5"))
                .and_then(|r| rating_bound("Minimum rating", r))
        })
        .transpose()?;
    let sort = SortMode::parse(params.sort_by.as_deref(), SortMode::Relevance);
    let page = Page::lenient(params.page.as_deref(), params.limit.as_deref());

    let log_id = best_effort(
        "log search query",
        trending::log_search(
            &state.db,
            q,
            extract_client_ip(&headers),
            extract_user_agent(&headers),
        ),
    )
    .await;

    let query = GameQuery {
        filter: GameFilter {
            text: Some(q.to_string()),
            category: category_id.map(|id| CategoryFilter::Ids(vec![id])),
            min_rating,
            ..Default::default()
        },
        audience,
        sort,
        page,
    };
    let result = query.fetch(&state.db).await?;

    if let Some(entry_id) = log_id {
        best_effort(
            "record search result count",
            trending::record_results(&state.db, entry_id, result.total),
        )
        .await;
    }

    let suggestions = if result.total == 0 {
        suggest::did_you_mean(&state.db, q).await?
    } else {
        Vec::new()
    };

    tracing::debug!(query = q, total = result.total, sort = sort.as_str(), "Search completed");

    Ok(Json(SearchResponse {
        games: GameResponse::from_rows(result.rows),
        suggestions,
        total: result.total,
        pagination: page.meta(result.total),
        search_info: SearchInfo {
            query: Some(q.to_string()),
            category_id,
            categories: None,
            min_rating,
            max_rating: None,
            min_play_count: None,
            tags: None,
            developer: None,
            featured: None,
            sort_by: sort.as_str(),
            execution_time: started.elapsed().as_millis(),
        },
    }))
}

/// `GET /search/suggestions` — Completions for a partial query.
async fn suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionParams>,
) -> Result<impl IntoResponse, AppError> {
    let partial = params.q.unwrap_or_default();
    let suggestions = suggest::suggest(&state.db, &partial).await?;
    Ok(Json(suggestions))
}

/// `GET /search/trending` — Most frequent successful searches of the last 7 days.
async fn trending_searches(
    State(state): State<AppState>,
    Query(params): Query<TrendingParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = trending::clamp_limit(params.limit.as_deref());
    let queries = trending::trending(&state.db, limit, chrono::Utc::now()).await?;
    Ok(Json(queries))
}

/// `POST /search/advanced` — Faceted search over every filter.
async fn advanced_search(
    State(state): State<AppState>,
    Viewer(audience): Viewer,
    payload: Result<Json<AdvancedSearchRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let started = Instant::now();
    let req = json_body(payload)?;

    let text = req
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(ToString::to_string);
    if text.as_ref().is_some_and(|q| q.chars().count() > MAX_QUERY_LEN) {
        return Err(AppError::validation(format!(
            "Search query must not exceed {MAX_QUERY_LEN} characters"
        )));
    }
    let min_rating = req
        .min_rating
        .map(|r| rating_bound("Minimum rating", r))
        .transpose()?;
    let max_rating = req
        .max_rating
        .map(|r| rating_bound("Maximum rating", r))
        .transpose()?;
    if req.min_play_count.is_some_and(|c| c < 0) {
        return Err(AppError::validation(
            "Minimum play count must not be negative",
        ));
    }

    let sort = SortMode::parse(req.sort_by.as_deref(), SortMode::Relevance);
    let page = Page::from_numbers(req.page, req.limit);
    let categories = req.categories.filter(|c| !c.is_empty());
    let tags = req.tags.filter(|t| !t.is_empty());
    let developer = req
        .developer
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    let query = GameQuery {
        filter: GameFilter {
            text: text.clone(),
            category: categories.clone().map(CategoryFilter::Ids),
            min_rating,
            max_rating,
            min_play_count: req.min_play_count,
            tags: tags.clone().unwrap_or_default(),
            developer: developer.clone(),
            featured_only: req.featured == Some(true),
        },
        audience,
        sort,
        page,
    };
    let result = query.fetch(&state.db).await?;

    let suggestions = match text.as_deref() {
        Some(q) if result.total == 0 => suggest::did_you_mean(&state.db, q).await?,
        _ => Vec::new(),
    };

    Ok(Json(SearchResponse {
        games: GameResponse::from_rows(result.rows),
        suggestions,
        total: result.total,
        pagination: page.meta(result.total),
        search_info: SearchInfo {
            query: text,
            category_id: None,
            categories,
            min_rating,
            max_rating,
            min_play_count: req.min_play_count,
            tags,
            developer,
            featured: req.featured,
            sort_by: sort.as_str(),
            execution_time: started.elapsed().as_millis(),
        },
    }))
}
