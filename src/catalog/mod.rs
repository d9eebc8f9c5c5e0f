//! Catalog search and listing: filtering, ordering, pagination, suggestions and
//! trending aggregation over the game catalog.

pub mod counters;
pub mod pagination;
pub mod query;
pub mod ranking;
pub mod slug;
pub mod suggest;
pub mod trending;

use std::fmt::Display;
use std::future::Future;

pub use pagination::{Page, PageMeta};
pub use query::{CategoryFilter, GameFilter, GameQuery};
pub use ranking::SortMode;

/// Who is asking. Decides whether non-active catalog entries are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Public,
    Staff,
}

impl Audience {
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Staff)
    }
}

/// Run a side effect whose failure must not fail the request.
///
/// A failure is logged at `warn` under `label` and discarded; the caller gets
/// `None` instead of an error and nothing is retried.
pub async fn best_effort<T, E, F>(label: &str, operation: F) -> Option<T>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match operation.await {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(error = %err, operation = label, "Best-effort write discarded");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_best_effort_passes_value_through() {
        let value = best_effort("noop", async { Ok::<_, String>(7) }).await;
        assert_eq!(value, Some(7));
    }

    #[tokio::test]
    async fn test_best_effort_swallows_failure() {
        let value = best_effort("boom", async { Err::<i32, _>("storage offline") }).await;
        assert_eq!(value, None);
    }
}
