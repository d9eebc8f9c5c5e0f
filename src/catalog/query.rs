//! Translate a listing or search request into a filtered, ordered, paginated
//! game query.

use sea_orm::sea_query::{Expr, Func, LikeExpr, Query, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Select,
};

use super::pagination::Page;
use super::ranking::{self, SortMode};
use super::Audience;
use crate::entities::{GameStatus, category, game};

/// How a request narrows games by category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Any of these category ids
    Ids(Vec<i32>),
    /// The category with this slug
    Slug(String),
}

/// Filters shared by listing, search and advanced search.
#[derive(Debug, Clone, Default)]
pub struct GameFilter {
    /// Case-insensitive substring of title, description or developer
    pub text: Option<String>,
    pub category: Option<CategoryFilter>,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
    pub min_play_count: Option<i64>,
    /// Every tag must be present on the game
    pub tags: Vec<String>,
    /// Case-insensitive substring of developer
    pub developer: Option<String>,
    pub featured_only: bool,
}

/// A complete listing request.
#[derive(Debug, Clone)]
pub struct GameQuery {
    pub filter: GameFilter,
    pub audience: Audience,
    pub sort: SortMode,
    pub page: Page,
}

/// One page of games with their categories, plus the unpaginated total.
#[derive(Debug, Clone)]
pub struct GamePage {
    pub rows: Vec<(game::Model, Option<category::Model>)>,
    pub total: u64,
}
/// Lowercased `%needle%` with `\`, `%` and `_` escaped, so the needle matches
/// Lowercased `%needle%` with `\\`, `%` and `_` escaped, so the needle matches
/// literally.
fn substring_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn lower_contains(column: SimpleExpr, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(column)).like(LikeExpr::new(substring_pattern(needle)).escape('\\'))
}

/// `LOWER(game.<col>) LIKE '%needle%'`, with `needle` lowercased.
pub(crate) fn contains_ci(column: game::Column, needle: &str) -> SimpleExpr {
    lower_contains(Expr::col((game::Entity, column)).into(), needle)
}

/// `LOWER(category.<col>) LIKE '%needle%'`.
pub(crate) fn category_contains_ci(column: category::Column, needle: &str) -> SimpleExpr {
    lower_contains(Expr::col((category::Entity, column)).into(), needle)
}

/// Filter condition for the public or staff view of the catalog.
#[must_use]
pub fn visibility(audience: Audience) -> Condition {
    let condition = Condition::all();
    if audience.is_staff() {
        condition
    } else {
        condition.add(game::Column::Status.eq(GameStatus::Active.as_str()))
    }
}

impl GameFilter {
    /// Storage-level condition for these filters. Absent filters impose nothing.
    #[must_use]
    pub fn condition(&self) -> Condition {
        let mut condition = Condition::all();

        if let Some(text) = self.text.as_deref().filter(|t| !t.is_empty()) {
            condition = condition.add(
                Condition::any()
                    .add(contains_ci(game::Column::Title, text))
                    .add(contains_ci(game::Column::Description, text))
                    .add(contains_ci(game::Column::Developer, text)),
            );
        }

        match &self.category {
            Some(CategoryFilter::Ids(ids)) if !ids.is_empty() => {
                condition = condition.add(game::Column::CategoryId.is_in(ids.iter().copied()));
            }
            Some(CategoryFilter::Slug(slug)) => {
                condition = condition.add(
                    game::Column::CategoryId.in_subquery(
                        Query::select()
                            .column(category::Column::Id)
                            .from(category::Entity)
                            .and_where(category::Column::Slug.eq(slug.as_str()))
                            .to_owned(),
                    ),
                );
            }
            _ => {}
        }

        if let Some(min) = self.min_rating {
            condition = condition.add(game::Column::Rating.gte(min));
        }
        if let Some(max) = self.max_rating {
            condition = condition.add(game::Column::Rating.lte(max));
        }
        if let Some(min) = self.min_play_count {
            condition = condition.add(game::Column::PlayCount.gte(min));
        }

        for tag in self.tags.iter().filter(|t| !t.is_empty()) {
            condition = condition.add(contains_ci(game::Column::Tags, &format!("\"{tag}\"")));
        }

        if let Some(developer) = self.developer.as_deref().filter(|d| !d.is_empty()) {
            condition = condition.add(contains_ci(game::Column::Developer, developer));
        }

        if self.featured_only {
            condition = condition.add(game::Column::IsFeatured.eq(true));
        }

        condition
    }
}

impl GameQuery {
    /// Filters plus the audience's visibility rule.
    #[must_use]
    pub fn condition(&self) -> Condition {
        Condition::all()
            .add(visibility(self.audience))
            .add(self.filter.condition())
    }

    /// Matching games, unordered and unpaginated.
    #[must_use]
    pub fn select(&self) -> Select<game::Entity> {
        game::Entity::find().filter(self.condition())
    }

    /// Run the query: count every match, then load the requested page in rank order.
    ///
    /// # Errors
    ///
    /// Returns the database error if either statement fails.
    pub async fn fetch<C>(&self, db: &C) -> Result<GamePage, DbErr>
    where
        C: ConnectionTrait,
    {
        let total = self.select().count(db).await?;

        let rows = ranking::apply(
            self.select().find_also_related(category::Entity),
            &self.sort.keys(),
        )
        .offset(self.page.offset())
        .limit(self.page.limit)
        .all(db)
        .await?;

        Ok(GamePage { rows, total })
    }
}
