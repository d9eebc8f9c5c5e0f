//! Search-as-you-type completions and "did you mean" near matches.

use std::collections::HashSet;

use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use super::query::{category_contains_ci, contains_ci};
use super::ranking::{self, SortMode};
use crate::entities::{GameStatus, category, game};

/// Shortest partial input that produces completions.
pub const MIN_PARTIAL_LEN: usize = 2;
/// Most completions returned.
pub const MAX_SUGGESTIONS: usize = 8;

const TITLE_CANDIDATES: u64 = 5;
const CATEGORY_CANDIDATES: u64 = 3;
const DEVELOPER_CANDIDATES: u64 = 3;
const DID_YOU_MEAN_LIMIT: u64 = 5;

/// Completions for a partial query: matching game titles, then category names,
/// then developers. Inputs shorter than [`MIN_PARTIAL_LEN`] characters return an
/// empty list without touching storage.
///
/// # Errors
///
/// Returns the database error if a candidate lookup fails.
pub async fn suggest<C>(db: &C, partial: &str) -> Result<Vec<String>, DbErr>
where
    C: ConnectionTrait,
{
    let partial = partial.trim();
    if partial.chars().count() < MIN_PARTIAL_LEN {
        return Ok(Vec::new());
    }

    let titles: Vec<String> = game::Entity::find()
        .select_only()
        .column(game::Column::Title)
        .filter(game::Column::Status.eq(GameStatus::Active.as_str()))
        .filter(contains_ci(game::Column::Title, partial))
        .order_by_desc(game::Column::PlayCount)
        .order_by_asc(game::Column::Id)
        .limit(TITLE_CANDIDATES)
        .into_tuple()
        .all(db)
        .await?;

    let categories: Vec<String> = category::Entity::find()
        .select_only()
        .column(category::Column::Name)
        .filter(category::Column::IsActive.eq(true))
        .filter(category_contains_ci(category::Column::Name, partial))
        .order_by_asc(category::Column::SortOrder)
        .order_by_asc(category::Column::Name)
        .limit(CATEGORY_CANDIDATES)
        .into_tuple()
        .all(db)
        .await?;

    let developers: Vec<Option<String>> = game::Entity::find()
        .select_only()
        .column(game::Column::Developer)
        .distinct()
        .filter(game::Column::Status.eq(GameStatus::Active.as_str()))
        .filter(game::Column::Developer.is_not_null())
        .filter(contains_ci(game::Column::Developer, partial))
        .order_by_asc(game::Column::Developer)
        .limit(DEVELOPER_CANDIDATES)
        .into_tuple()
        .all(db)
        .await?;

    Ok(merge_candidates(
        titles,
        categories,
        developers.into_iter().flatten().collect(),
    ))
}

/// Concatenate candidate groups in priority order, keep the first occurrence of
/// each exact string and stop at [`MAX_SUGGESTIONS`].
#[must_use]
pub fn merge_candidates(
    titles: Vec<String>,
    categories: Vec<String>,
    developers: Vec<String>,
) -> Vec<String> {
    let mut seen = HashSet::new();
    titles
        .into_iter()
        .chain(categories)
        .chain(developers)
        .filter(|candidate| !candidate.is_empty() && seen.insert(candidate.clone()))
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// The query with its last character dropped, but never shorter than
/// [`MIN_PARTIAL_LEN`] characters.
#[must_use]
pub fn shortened(query: &str) -> String {
    let len = query.chars().count();
    query
        .chars()
        .take(len.saturating_sub(1).max(MIN_PARTIAL_LEN))
        .collect()
}

/// Titles of popular active games resembling a query that matched nothing.
///
/// Matches titles containing either the whole query or its [`shortened`] form.
/// A cheap heuristic rather than an edit-distance search.
///
/// # Errors
///
/// Returns the database error if the lookup fails.
pub async fn did_you_mean<C>(db: &C, query: &str) -> Result<Vec<String>, DbErr>
where
    C: ConnectionTrait,
{
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let keys = SortMode::Popular.keys();
    let games = ranking::apply(
        game::Entity::find()
            .filter(game::Column::Status.eq(GameStatus::Active.as_str()))
            .filter(
                Condition::any()
                    .add(contains_ci(game::Column::Title, query))
                    .add(contains_ci(game::Column::Title, &shortened(query))),
            ),
        &keys,
    )
    .limit(DID_YOU_MEAN_LIMIT)
    .all(db)
    .await?;

    let mut seen = HashSet::new();
    Ok(games
        .into_iter()
        .map(|g| g.title)
        .filter(|title| seen.insert(title.clone()))
        .collect())
}
