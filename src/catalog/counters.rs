//! Monotonic engagement counters.
//!
//! Each bump is a single `col = col + 1` statement, so concurrent bumps never
//! overwrite each other.

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};

use crate::entities::{advertisement, game};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameCounter {
    Plays,
    Views,
}

impl GameCounter {
    const fn column(self) -> game::Column {
        match self {
            Self::Plays => game::Column::PlayCount,
            Self::Views => game::Column::Views,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdCounter {
    Impressions,
    Clicks,
}

impl AdCounter {
    const fn column(self) -> advertisement::Column {
        match self {
            Self::Impressions => advertisement::Column::Impressions,
            Self::Clicks => advertisement::Column::Clicks,
        }
    }
}

/// Add one to a game counter. Returns the number of rows touched.
///
/// # Errors
///
/// Returns the database error if the update fails.
pub async fn bump_game<C>(db: &C, game_id: i32, counter: GameCounter) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let column = counter.column();
    let result = game::Entity::update_many()
        .col_expr(column, Expr::col(column).add(1))
        .filter(game::Column::Id.eq(game_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Add one to a counter on every listed ad. Returns the number of rows touched.
///
/// # Errors
///
/// Returns the database error if the update fails.
pub async fn bump_ads<C>(db: &C, ad_ids: &[i32], counter: AdCounter) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    if ad_ids.is_empty() {
        return Ok(0);
    }
    let column = counter.column();
    let result = advertisement::Entity::update_many()
        .col_expr(column, Expr::col(column).add(1))
        .filter(advertisement::Column::Id.is_in(ad_ids.iter().copied()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
