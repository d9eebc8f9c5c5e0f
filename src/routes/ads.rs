use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use serde::Deserialize;

use super::parse_id;
use crate::auth::middleware::StaffUser;
use crate::catalog::best_effort;
use crate::catalog::counters::{self, AdCounter};
use crate::dto::ad::{AdMutationResponse, AdRequest, AdStatsResponse};
use crate::dto::{AdResponse, MessageResponse};
use crate::entities::{AdPosition, advertisement};
use crate::error::{AppError, json_body};
use crate::state::AppState;

/// Advertisement router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_ads).post(create_ad))
        .route("/position/{position}", get(ads_for_position))
        .route("/{id}", get(get_ad).put(update_ad).delete(delete_ad))
        .route("/{id}/click", post(record_click))
        .route("/{id}/toggle", patch(toggle_ad))
        .route("/{id}/stats", get(ad_stats))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListAdsQuery {
    include_inactive: Option<String>,
}

// ============================================================================
// Public Handlers
// ============================================================================

/// `GET /ads/position/{position}` — Active, currently scheduled ads for one slot.
///
/// Serving counts as an impression for every returned ad.
async fn ads_for_position(
    State(state): State<AppState>,
    Path(position): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let position = AdPosition::from_str(&position).ok_or_else(|| {
        AppError::Rejected("INVALID_POSITION", "Invalid ad position".to_string())
    })?;

    let now = chrono::Utc::now().fixed_offset();
    let ads: Vec<advertisement::Model> = advertisement::Entity::find()
        .filter(advertisement::Column::Position.eq(position.as_str()))
        .filter(advertisement::Column::IsActive.eq(true))
        .order_by_desc(advertisement::Column::CreatedAt)
        .order_by_asc(advertisement::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .filter(|ad| ad.is_scheduled_at(now))
        .collect();

    let ids: Vec<i32> = ads.iter().map(|ad| ad.id).collect();
    best_effort(
        "record ad impressions",
        counters::bump_ads(&state.db, &ids, AdCounter::Impressions),
    )
    .await;

    Ok(Json(
        ads.into_iter().map(AdResponse::from).collect::<Vec<_>>(),
    ))
}

/// `POST /ads/{id}/click` — Count a click on an active ad.
async fn record_click(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let ad = advertisement::Entity::find_by_id(id)
        .filter(advertisement::Column::IsActive.eq(true))
        .one(&state.db)
        .await?
        .ok_or_else(ad_not_found)?;

    counters::bump_ads(&state.db, &[ad.id], AdCounter::Clicks).await?;
    tracing::debug!(ad_id = ad.id, "Ad click recorded");

    Ok(Json(MessageResponse::new("Click recorded")))
}

// ============================================================================
// Staff Handlers
// ============================================================================

/// `GET /ads` — Every ad, grouped by position, newest first (staff only).
async fn list_ads(
    State(state): State<AppState>,
    StaffUser(_): StaffUser,
    Query(params): Query<ListAdsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut select = advertisement::Entity::find()
        .order_by_asc(advertisement::Column::Position)
        .order_by_desc(advertisement::Column::CreatedAt)
        .order_by_asc(advertisement::Column::Id);
    if params.include_inactive.as_deref() != Some("true") {
        select = select.filter(advertisement::Column::IsActive.eq(true));
    }
    let ads = select.all(&state.db).await?;

    Ok(Json(
        ads.into_iter().map(AdResponse::from).collect::<Vec<_>>(),
    ))
}

/// `GET /ads/{id}` — One ad regardless of state (staff only).
async fn get_ad(
    State(state): State<AppState>,
    StaffUser(_): StaffUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let ad = find_ad(&state.db, parse_id(&id)?).await?;
    Ok(Json(AdResponse::from(ad)))
}

/// `POST /ads` — Create an ad (staff only).
async fn create_ad(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    payload: Result<Json<AdRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = json_body(payload)?.validate()?;
    let now = chrono::Utc::now();

    let ad = advertisement::ActiveModel {
        name: ActiveValue::Set(req.name),
        position: ActiveValue::Set(req.position.as_str().to_string()),
        size: ActiveValue::Set(req.size),
        code: ActiveValue::Set(req.code),
        is_active: ActiveValue::Set(req.is_active),
        impressions: ActiveValue::Set(0),
        clicks: ActiveValue::Set(0),
        start_date: ActiveValue::Set(req.start_date),
        end_date: ActiveValue::Set(req.end_date),
        created_at: ActiveValue::Set(now.into()),
        updated_at: ActiveValue::Set(now.into()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(ad_id = ad.id, position = %ad.position, staff = %staff.sub, "Ad created");

    Ok((
        StatusCode::CREATED,
        Json(AdMutationResponse {
            message: "Ad created successfully".to_string(),
            ad: ad.into(),
        }),
    ))
}

/// `PUT /ads/{id}` — Replace an ad's definition (staff only). Counters are kept.
async fn update_ad(
    State(state): State<AppState>,
    StaffUser(_): StaffUser,
    Path(id): Path<String>,
    payload: Result<Json<AdRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let req = json_body(payload)?.validate()?;

    let mut active: advertisement::ActiveModel = find_ad(&state.db, id).await?.into();
    active.name = ActiveValue::Set(req.name);
    active.position = ActiveValue::Set(req.position.as_str().to_string());
    active.size = ActiveValue::Set(req.size);
    active.code = ActiveValue::Set(req.code);
    active.is_active = ActiveValue::Set(req.is_active);
    active.start_date = ActiveValue::Set(req.start_date);
    active.end_date = ActiveValue::Set(req.end_date);
    active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
    let ad = active.update(&state.db).await?;

    Ok(Json(AdMutationResponse {
        message: "Ad updated successfully".to_string(),
        ad: ad.into(),
    }))
}

/// `DELETE /ads/{id}` — Remove an ad (staff only).
async fn delete_ad(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let ad = find_ad(&state.db, parse_id(&id)?).await?;
    advertisement::Entity::delete_by_id(ad.id)
        .exec(&state.db)
        .await?;
    tracing::info!(ad_id = ad.id, staff = %staff.sub, "Ad deleted");

    Ok(Json(MessageResponse::new("Ad deleted successfully")))
}

/// `PATCH /ads/{id}/toggle` — Set or flip the active flag (staff only).
///
/// An empty body flips the flag; `{"isActive": bool}` sets it.
async fn toggle_ad(
    State(state): State<AppState>,
    StaffUser(_): StaffUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let requested = requested_state(&body)?;

    let existing = find_ad(&state.db, id).await?;
    let is_active = requested.unwrap_or(!existing.is_active);

    let mut active: advertisement::ActiveModel = existing.into();
    active.is_active = ActiveValue::Set(is_active);
    active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
    let ad = active.update(&state.db).await?;

    let message = if is_active {
        "Ad activated successfully"
    } else {
        "Ad deactivated successfully"
    };
    Ok(Json(AdMutationResponse {
        message: message.to_string(),
        ad: ad.into(),
    }))
}

/// `GET /ads/{id}/stats` — Impressions, clicks and click-through rate (staff only).
async fn ad_stats(
    State(state): State<AppState>,
    StaffUser(_): StaffUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let ad = find_ad(&state.db, parse_id(&id)?).await?;
    Ok(Json(AdStatsResponse::from(ad)))
}

// ============================================================================
// Helpers
// ============================================================================

fn ad_not_found() -> AppError {
    AppError::NotFound("AD_NOT_FOUND", "Advertisement not found".to_string())
}

async fn find_ad(db: &DatabaseConnection, id: i32) -> Result<advertisement::Model, AppError> {
    advertisement::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(ad_not_found)
}

/// Read the optional `isActive` flag of a toggle body.
fn requested_state(body: &[u8]) -> Result<Option<bool>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| AppError::validation(format!("Invalid JSON body: {e}")))?;
    match value.get("isActive") {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Bool(flag)) => Ok(Some(*flag)),
        Some(_) => Err(AppError::Rejected(
            "INVALID_STATUS",
            "isActive must be a boolean".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_state() {
        assert_eq!(requested_state(b"").ok(), Some(None));
        assert_eq!(requested_state(b"  \n").ok(), Some(None));
        assert_eq!(requested_state(b"{}").ok(), Some(None));
        assert_eq!(
            requested_state(br#"{"isActive": false}"#).ok(),
            Some(Some(false))
        );
        assert!(requested_state(br#"{"isActive": "yes"}"#).is_err());
        assert!(requested_state(b"{not json").is_err());
    }
}
