mod ads;
mod admin;
mod categories;
mod games;
mod health;
mod search;

use axum::Router;

use crate::error::{AppError, route_not_found};
use crate::state::AppState;

/// Build the complete application router.
///
/// Structure:
/// - `GET /health` — liveness check
/// - `GET /api/v1/health` — health check with database round-trip latency
/// - `/api/v1/games`, `/api/v1/categories`, `/api/v1/search`, `/api/v1/ads`,
///   `/api/v1/admin` — catalog API
///
/// Unknown paths answer 404 `ROUTE_NOT_FOUND`.
pub fn router() -> Router<AppState> {
    let api_v1 = Router::new()
        .merge(health::api_router())
        .nest("/games", games::router())
        .nest("/categories", categories::router())
        .nest("/search", search::router())
        .nest("/ads", ads::router())
        .nest("/admin", admin::router());

    Router::new()
        .merge(health::root_router())
        .nest("/api/v1", api_v1)
        .fallback(route_not_found)
}

/// A path segment naming a record by numeric id or by slug.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Identifier {
    Id(i32),
    Slug(String),
}

impl Identifier {
    /// All-digit segments are ids; anything else is a slug.
    fn parse(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = raw.parse::<i32>() {
                return Self::Id(id);
            }
        }
        Self::Slug(raw.to_string())
    }
}

/// Parse a numeric path id.
fn parse_id(raw: &str) -> Result<i32, AppError> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id >= 1)
        .ok_or_else(|| AppError::validation("ID must be a positive integer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_parse() {
        assert_eq!(Identifier::parse("42"), Identifier::Id(42));
        assert_eq!(
            Identifier::parse("block-puzzles"),
            Identifier::Slug("block-puzzles".to_string())
        );
        assert_eq!(
            Identifier::parse("2048"),
            Identifier::Id(2048)
        );
        assert_eq!(
            Identifier::parse("99999999999"),
            Identifier::Slug("99999999999".to_string())
        );
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("7").ok(), Some(7));
        assert!(parse_id("0").is_err());
        assert!(parse_id("-3").is_err());
        assert!(parse_id("abc").is_err());
    }
}
