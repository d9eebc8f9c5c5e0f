//! Result ordering.
//!
//! A sort mode expands to a list of [`SortKey`]s. The same list drives the SQL
//! `ORDER BY` and the in-memory comparator, so both always agree. Every list ends
//! with `id ASC`, which makes the order total and keeps pagination stable.

use std::cmp::Ordering;

use sea_orm::sea_query::NullOrdering;
use sea_orm::{Order, QueryOrder};

use crate::entities::game;

/// Requested result order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Featured first, then rating, then plays
    Relevance,
    /// Most played first
    Popular,
    Newest,
    Oldest,
    /// Highest rated first, more reviews breaking ties
    Rating,
    /// Alphabetical by title
    Name,
}

impl SortMode {
    /// Parse a `sortBy` / `sort` value.
    ///
    /// An absent or blank value yields `default`; an unrecognised one yields
    /// [`SortMode::Relevance`].
    #[must_use]
    pub fn parse(raw: Option<&str>, default: Self) -> Self {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => default,
            Some(value) => match value.to_lowercase().as_str() {
                "popular" | "plays" => Self::Popular,
                "newest" => Self::Newest,
                "oldest" => Self::Oldest,
                "rating" => Self::Rating,
                "name" => Self::Name,
                _ => Self::Relevance,
            },
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Popular => "popular",
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Rating => "rating",
            Self::Name => "name",
        }
    }

    /// Ordering keys for this mode, with the `id ASC` tie-break appended.
    #[must_use]
    pub fn keys(self) -> Vec<SortKey> {
        use SortField::{CreatedAt, Featured, Id, PlayCount, Rating, ReviewCount, Title};

        let mut keys = match self {
            Self::Relevance => vec![
                SortKey::desc(Featured),
                SortKey::desc(Rating),
                SortKey::desc(PlayCount),
            ],
            Self::Popular => vec![SortKey::desc(PlayCount)],
            Self::Newest => vec![SortKey::desc(CreatedAt)],
            Self::Oldest => vec![SortKey::asc(CreatedAt)],
            Self::Rating => vec![SortKey::desc(Rating), SortKey::desc(ReviewCount)],
            Self::Name => vec![SortKey::asc(Title)],
        };
        keys.push(SortKey::asc(Id));
        keys
    }
}

/// Game attribute a key orders by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Featured,
    Rating,
    PlayCount,
    ReviewCount,
    CreatedAt,
    Title,
    Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub descending: bool,
}

impl SortKey {
    #[must_use]
    pub const fn asc(field: SortField) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    #[must_use]
    pub const fn desc(field: SortField) -> Self {
        Self {
            field,
            descending: true,
        }
    }

    const fn order(self) -> Order {
        if self.descending { Order::Desc } else { Order::Asc }
    }

    /// Compare two games on this key alone. Missing ratings rank below any
    /// rating, so they land last when descending.
    fn compare(self, a: &game::Model, b: &game::Model) -> Ordering {
        let ordering = match self.field {
            SortField::Featured => a.is_featured.cmp(&b.is_featured),
            SortField::Rating => match (a.rating, b.rating) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => Ordering::Equal,
            },
            SortField::PlayCount => a.play_count.cmp(&b.play_count),
            SortField::ReviewCount => a.review_count.cmp(&b.review_count),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Title => a.title.cmp(&b.title),
            SortField::Id => a.id.cmp(&b.id),
        };
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// Append the keys as `ORDER BY` clauses.
#[must_use]
pub fn apply<Q>(mut select: Q, keys: &[SortKey]) -> Q
where
    Q: QueryOrder,
{
    for key in keys {
        let order = key.order();
        select = match key.field {
            SortField::Featured => select.order_by(game::Column::IsFeatured, order),
            SortField::Rating => {
                let nulls = if key.descending {
                    NullOrdering::Last
                } else {
                    NullOrdering::First
                };
                select.order_by_with_nulls(game::Column::Rating, order, nulls)
            }
            SortField::PlayCount => select.order_by(game::Column::PlayCount, order),
            SortField::ReviewCount => select.order_by(game::Column::ReviewCount, order),
            SortField::CreatedAt => select.order_by(game::Column::CreatedAt, order),
            SortField::Title => select.order_by(game::Column::Title, order),
            SortField::Id => select.order_by(game::Column::Id, order),
        };
    }
    select
}

/// Compare two games by the full key list.
#[must_use]
pub fn compare(keys: &[SortKey], a: &game::Model, b: &game::Model) -> Ordering {
    keys.iter()
        .map(|key| key.compare(a, b))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Sort games in memory by the key list.
pub fn sort_games(games: &mut [game::Model], keys: &[SortKey]) {
    games.sort_by(|a, b| compare(keys, a, b));
}
