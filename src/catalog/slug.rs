use std::future::Future;

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter};

use crate::entities::{category, game};

/// URL-safe slug for a display name.
///
/// Lowercases ASCII letters and digits; whitespace, `-` and `_` separate words;
/// every other character is dropped. A name with nothing left yields `"untitled"`.
#[must_use]
pub fn slugify(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() {
                Some(c.to_ascii_lowercase())
            } else if c.is_whitespace() || c == '-' || c == '_' {
                Some('-')
            } else {
                None
            }
        })
        .collect();

    let slug = cleaned
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// First of `base`, `base-1`, `base-2`, ... for which `taken` answers `false`.
///
/// # Errors
///
/// Propagates the first error returned by `taken`.
pub async fn resolve_unique<F, Fut>(base: &str, mut taken: F) -> Result<String, DbErr>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, DbErr>>,
{
    let mut candidate = base.to_string();
    let mut counter = 1u32;
    while taken(candidate.clone()).await? {
        candidate = format!("{base}-{counter}");
        counter += 1;
    }
    Ok(candidate)
}

/// Unique game slug for `title`, ignoring the game `exclude` (the one being renamed).
///
/// # Errors
///
/// Returns the database error if a lookup fails.
pub async fn unique_game_slug<C>(db: &C, title: &str, exclude: Option<i32>) -> Result<String, DbErr>
where
    C: ConnectionTrait,
{
    resolve_unique(&slugify(title), |candidate| async move {
        let mut query = game::Entity::find().filter(game::Column::Slug.eq(candidate));
        if let Some(id) = exclude {
            query = query.filter(game::Column::Id.ne(id));
        }
        Ok(query.count(db).await? > 0)
    })
    .await
}

/// Unique category slug for `name`, ignoring the category `exclude`.
///
/// # Errors
///
/// Returns the database error if a lookup fails.
pub async fn unique_category_slug<C>(
    db: &C,
    name: &str,
    exclude: Option<i32>,
) -> Result<String, DbErr>
where
    C: ConnectionTrait,
{
    resolve_unique(&slugify(name), |candidate| async move {
        let mut query = category::Entity::find().filter(category::Column::Slug.eq(candidate));
        if let Some(id) = exclude {
            query = query.filter(category::Column::Id.ne(id));
        }
        Ok(query.count(db).await? > 0)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Block Puzzles!!"), "block-puzzles");
        assert_eq!(slugify("  Space   Invaders 2 "), "space-invaders-2");
        assert_eq!(slugify("snake_case-and--dashes"), "snake-case-and-dashes");
        assert_eq!(slugify("Café Racer"), "caf-racer");
        assert_eq!(slugify("!!!"), "untitled");
    }

    #[tokio::test]
    async fn test_resolve_unique_appends_counter() {
        let existing = ["block-puzzles", "block-puzzles-1"];
        let slug = resolve_unique("block-puzzles", |candidate| async move {
            Ok(existing.contains(&candidate.as_str()))
        })
        .await;
        assert_eq!(slug.ok().as_deref(), Some("block-puzzles-2"));
    }

    #[tokio::test]
    async fn test_resolve_unique_free_base() {
        let slug = resolve_unique("fresh", |_| async { Ok(false) }).await;
        assert_eq!(slug.ok().as_deref(), Some("fresh"));
    }
}
