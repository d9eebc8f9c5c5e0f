use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, watch};

use super::api::{GameCard, SearchApi, SearchRequest};
use super::controller::TRENDING_SHOWN;
use crate::catalog::PageMeta;

/// Results grid state. Loading, empty and failed never overlap.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResultsState {
    #[default]
    Idle,
    Loading,
    Loaded {
        games: Vec<GameCard>,
        total: u64,
        pagination: PageMeta,
    },
    /// Nothing matched: offer near matches and what others search for
    Empty {
        query: String,
        suggestions: Vec<String>,
        trending: Vec<String>,
    },
    /// The request failed; [`ResultsView::retry`] repeats it
    Failed { message: String },
}

/// Drives the results grid for one page.
pub struct ResultsView {
    api: Arc<dyn SearchApi>,
    state: watch::Sender<ResultsState>,
    sequence: AtomicU64,
    last: Mutex<Option<SearchRequest>>,
}

impl ResultsView {
    pub fn new(api: Arc<dyn SearchApi>) -> Self {
        let (state, _) = watch::channel(ResultsState::Idle);
        Self {
            api,
            state,
            sequence: AtomicU64::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ResultsState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> ResultsState {
        self.state.borrow().clone()
    }

    /// Fetch a results page. A later call supersedes any load still in flight.
    pub async fn load(&self, request: SearchRequest) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last.lock().await = Some(request.clone());
        self.state.send_replace(ResultsState::Loading);

        let next = match self.api.search(&request).await {
            Ok(results) if results.total == 0 => {
                let trending = self
                    .api
                    .trending(TRENDING_SHOWN)
                    .await
                    .unwrap_or_else(|e| {
                        tracing::debug!(error = %e, "Trending fetch failed");
                        Vec::new()
                    });
                ResultsState::Empty {
                    query: request.query.clone(),
                    suggestions: results.suggestions,
                    trending,
                }
            }
            Ok(results) => ResultsState::Loaded {
                games: results.games,
                total: results.total,
                pagination: results.pagination,
            },
            Err(e) => {
                tracing::warn!(query = %request.query, error = %e, "Search request failed");
                ResultsState::Failed {
                    message: e.to_string(),
                }
            }
        };

        if self.sequence.load(Ordering::SeqCst) != seq {
            tracing::debug!(query = %request.query, seq, "Discarding stale results");
            return;
        }
        self.state.send_replace(next);
    }

    /// Repeat the last request. Returns `false` when nothing was loaded yet.
    pub async fn retry(&self) -> bool {
        let last = self.last.lock().await.clone();
        match last {
            Some(request) => {
                self.load(request).await;
                true
            }
            None => false,
        }
    }

    /// Load another page of the last request.
    pub async fn go_to_page(&self, page: u64) -> bool {
        let last = self.last.lock().await.clone();
        match last {
            Some(request) => {
                self.load(SearchRequest {
                    page: page.max(1),
                    ..request
                })
                .await;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeApi;

    fn view(api: &Arc<FakeApi>) -> ResultsView {
        ResultsView::new(Arc::clone(api) as Arc<dyn SearchApi>)
    }

    #[tokio::test(start_paused = true)]
    async fn test_loaded() {
        let api = Arc::new(FakeApi::default());
        let view = view(&api);
        assert_eq!(view.state(), ResultsState::Idle);

        view.load(SearchRequest::new("tetris")).await;
        match view.state() {
            ResultsState::Loaded { games, total, .. } => {
                assert_eq!(total, 1);
                assert_eq!(games.len(), 1);
            }
            other => assert_eq!(other, ResultsState::Idle, "expected Loaded"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_shows_suggestions_and_trending() {
        let api = Arc::new(FakeApi::with_trending(&["snake"]));
        let view = view(&api);

        view.load(SearchRequest::new("none")).await;
        assert_eq!(
            view.state(),
            ResultsState::Empty {
                query: "none".to_string(),
                suggestions: vec!["Ninjutsu Master".to_string()],
                trending: vec!["snake".to_string()],
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_then_retry() {
        let api = Arc::new(FakeApi::default());
        let view = view(&api);
        assert!(!view.retry().await);

        api.fail(true);
        view.load(SearchRequest::new("tetris")).await;
        assert!(matches!(view.state(), ResultsState::Failed { .. }));

        api.fail(false);
        assert!(view.retry().await);
        assert!(matches!(view.state(), ResultsState::Loaded { .. }));
        assert_eq!(api.calls().await, vec!["search:tetris", "search:tetris"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_load_wins() {
        let api = Arc::new(FakeApi::default());
        let view = view(&api);

        tokio::join!(
            view.load(SearchRequest::new("slow query")),
            view.load(SearchRequest::new("fast query")),
        );

        match view.state() {
            ResultsState::Loaded { games, .. } => {
                assert_eq!(
                    games.first().map(|g| g.title.as_str()),
                    Some("fast query")
                );
            }
            other => assert_eq!(other, ResultsState::Idle, "expected Loaded"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_go_to_page() {
        let api = Arc::new(FakeApi::default());
        let view = view(&api);
        assert!(!view.go_to_page(2).await);

        view.load(SearchRequest::new("tetris")).await;
        assert!(view.go_to_page(2).await);
        assert_eq!(view.last.lock().await.as_ref().map(|r| r.page), Some(2));
    }
}
