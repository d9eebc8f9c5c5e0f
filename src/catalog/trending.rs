use chrono::{DateTime, Duration, FixedOffset, Utc};
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, Order,
    QueryFilter, QueryOrder, QuerySelect,
};

use crate::entities::search_query;

/// How far back the search log is considered.
pub const WINDOW_DAYS: i64 = 7;
pub const DEFAULT_TRENDING: u64 = 10;
pub const MAX_TRENDING: u64 = 50;

/// Clamp a requested trending size to `1..=MAX_TRENDING`, defaulting when absent
/// or unparsable.
#[must_use]
pub fn clamp_limit(raw: Option<&str>) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v >= 1)
        .unwrap_or(DEFAULT_TRENDING)
        .min(MAX_TRENDING)
}

/// Most frequent successful searches since `now - WINDOW_DAYS`.
///
/// Only logged searches that found at least one game count. Ties on frequency
/// are ordered by query text.
///
/// # Errors
///
/// Returns the database error if the aggregation fails.
pub async fn trending<C>(db: &C, limit: u64, now: DateTime<Utc>) -> Result<Vec<String>, DbErr>
where
    C: ConnectionTrait,
{
    let since: DateTime<FixedOffset> = (now - Duration::days(WINDOW_DAYS)).into();
    let hits = Alias::new("hits");

    let rows: Vec<(String, i64)> = search_query::Entity::find()
        .select_only()
        .column(search_query::Column::Query)
        .column_as(search_query::Column::Id.count(), "hits")
        .filter(search_query::Column::CreatedAt.gte(since))
        .filter(search_query::Column::Results.gt(0))
        .group_by(search_query::Column::Query)
        .order_by(Expr::col(hits), Order::Desc)
        .order_by_asc(search_query::Column::Query)
        .limit(limit)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows.into_iter().map(|(query, _)| query).collect())
}

/// Append a search to the log with a zero result count. Returns the row id.
///
/// # Errors
///
/// Returns the database error if the insert fails.
pub async fn log_search<C>(
    db: &C,
    query: &str,
    ip_address: Option<String>,
    user_agent: Option<String>,
) -> Result<i32, DbErr>
where
    C: ConnectionTrait,
{
    let entry = search_query::ActiveModel {
        query: ActiveValue::Set(query.to_string()),
        ip_address: ActiveValue::Set(ip_address),
        user_agent: ActiveValue::Set(user_agent),
        results: ActiveValue::Set(0),
        created_at: ActiveValue::Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(entry.id)
}

/// Record how many games a logged search found.
///
/// # Errors
///
/// Returns the database error if the update fails.
pub async fn record_results<C>(db: &C, entry_id: i32, results: u64) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    search_query::Entity::update_many()
        .col_expr(
            search_query::Column::Results,
            Expr::value(i64::try_from(results).unwrap_or(i64::MAX)),
        )
        .filter(search_query::Column::Id.eq(entry_id))
        .exec(db)
        .await?;
    Ok(())
}
