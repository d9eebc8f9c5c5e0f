use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use super::api::{SearchApi, results_path};
use super::debounce::Debouncer;
use super::recent::RecentSearches;
use super::storage::{KeyValueStore, read_list, write_list};
use crate::catalog::suggest::MIN_PARTIAL_LEN;

pub const TRENDING_KEY: &str = "trendingSearches";
/// Trending entries shown in the panel.
pub const TRENDING_SHOWN: u64 = 5;

/// Where the widget is in its input cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Waiting out the debounce delay
    Typing,
    FetchingSuggestions,
    DisplayingSuggestions,
    Submitting,
    Navigated,
}

/// Everything a renderer needs to draw the widget.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WidgetState {
    pub text: String,
    pub focused: bool,
    pub panel_open: bool,
    pub phase: Phase,
    pub suggestions: Vec<String>,
    pub recent: Vec<String>,
    pub trending: Vec<String>,
}

/// Keys the widget reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Other,
}

/// What the host page should do after a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank query, or a key with no submit meaning
    Ignored,
    /// Handed to the installed submit callback
    Delivered,
    /// No callback installed: go to this results path
    Navigate(String),
}

type SubmitCallback = Box<dyn Fn(&str) + Send + Sync>;

/// State shared with debounced fetch tasks.
struct Shared {
    api: Arc<dyn SearchApi>,
    state: watch::Sender<WidgetState>,
    sequence: AtomicU64,
}

impl Shared {
    /// Start a new generation; responses tagged with older ones are stale.
    fn advance(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, seq: u64) -> bool {
        self.sequence.load(Ordering::SeqCst) == seq
    }

    async fn fetch_suggestions(&self, seq: u64, query: String) {
        if !self.is_current(seq) {
            return;
        }
        self.state
            .send_modify(|s| s.phase = Phase::FetchingSuggestions);

        let suggestions = match self.api.suggestions(&query).await {
            Ok(list) => list,
            Err(e) => {
                tracing::debug!(query = %query, error = %e, "Suggestion fetch failed");
                Vec::new()
            }
        };

        if !self.is_current(seq) {
            tracing::debug!(query = %query, seq, "Discarding stale suggestions");
            return;
        }
        self.state.send_modify(|s| {
            s.suggestions = suggestions;
            s.phase = Phase::DisplayingSuggestions;
        });
    }
}

/// One search widget instance.
pub struct SearchController {
    shared: Arc<Shared>,
    store: Arc<dyn KeyValueStore>,
    recent: RecentSearches,
    debouncer: Debouncer,
    on_submit: Option<SubmitCallback>,
}

impl SearchController {
    pub fn new(api: Arc<dyn SearchApi>, store: Arc<dyn KeyValueStore>) -> Self {
        let recent = RecentSearches::new(Arc::clone(&store));
        let initial = WidgetState {
            recent: recent.shown(),
            trending: read_list(store.as_ref(), TRENDING_KEY),
            ..WidgetState::default()
        };
        let (state, _) = watch::channel(initial);

        Self {
            shared: Arc::new(Shared {
                api,
                state,
                sequence: AtomicU64::new(0),
            }),
            store,
            recent,
            debouncer: Debouncer::default(),
            on_submit: None,
        }
    }

    /// Deliver submitted queries to `callback` instead of navigating.
    #[must_use]
    pub fn with_on_submit(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_submit = Some(Box::new(callback));
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<WidgetState> {
        self.shared.state.subscribe()
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> WidgetState {
        self.shared.state.borrow().clone()
    }

    /// Refresh trending searches from the API. On failure the cached list stays.
    pub async fn load_trending(&self) {
        match self.shared.api.trending(TRENDING_SHOWN).await {
            Ok(trending) => {
                write_list(self.store.as_ref(), TRENDING_KEY, &trending);
                self.shared.state.send_modify(|s| s.trending = trending);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Trending fetch failed, keeping cached list");
            }
        }
    }

    /// Text changed. Schedules a suggestion fetch once the text is long enough.
    pub fn input(&mut self, text: &str) {
        let seq = self.shared.advance();
        let query = text.trim().to_string();
        let fetches = query.chars().count() >= MIN_PARTIAL_LEN;

        self.shared.state.send_modify(|s| {
            s.text = text.to_string();
            s.focused = true;
            s.panel_open = true;
            if fetches {
                s.phase = Phase::Typing;
            } else {
                s.phase = Phase::Idle;
                s.suggestions.clear();
            }
        });

        if !fetches {
            self.debouncer.cancel();
            return;
        }

        let shared = Arc::clone(&self.shared);
        self.debouncer
            .schedule(async move { shared.fetch_suggestions(seq, query).await });
    }

    pub fn key(&mut self, key: Key) -> SubmitOutcome {
        match key {
            Key::Enter => self.submit(),
            Key::Escape => {
                self.debouncer.cancel();
                self.shared.advance();
                self.shared.state.send_modify(|s| {
                    s.panel_open = false;
                    s.focused = false;
                    s.phase = Phase::Idle;
                });
                SubmitOutcome::Ignored
            }
            Key::Other => SubmitOutcome::Ignored,
        }
    }

    pub fn focus(&self) {
        let recent = self.recent.shown();
        self.shared.state.send_modify(|s| {
            s.focused = true;
            s.panel_open = true;
            s.recent = recent;
        });
    }

    /// A pointer went down; only presses outside the widget close the panel.
    pub fn pointer_down(&self, inside_widget: bool) {
        if !inside_widget {
            self.shared.state.send_modify(|s| s.panel_open = false);
        }
    }

    /// Submit the current text.
    pub fn submit(&mut self) -> SubmitOutcome {
        let query = self.shared.state.borrow().text.trim().to_string();
        if query.is_empty() {
            return SubmitOutcome::Ignored;
        }

        self.debouncer.cancel();
        self.shared.advance();
        let mut recent = self.recent.record(&query);
        recent.truncate(super::recent::SHOWN_RECENT);
        self.shared.state.send_modify(|s| {
            s.panel_open = false;
            s.phase = Phase::Submitting;
            s.suggestions.clear();
            s.recent = recent;
        });
        tracing::debug!(query = %query, "Search submitted");

        if let Some(callback) = &self.on_submit {
            callback(&query);
            self.shared.state.send_modify(|s| s.phase = Phase::Idle);
            SubmitOutcome::Delivered
        } else {
            self.shared.state.send_modify(|s| s.phase = Phase::Navigated);
            SubmitOutcome::Navigate(results_path(&query))
        }
    }

    /// Submit a suggestion, recent or trending entry picked from the panel.
    pub fn select(&mut self, entry: &str) -> SubmitOutcome {
        self.shared
            .state
            .send_modify(|s| s.text = entry.to_string());
        self.submit()
    }

    /// Clear button: empty the text and close the panel, keeping focus.
    pub fn clear(&mut self) {
        self.debouncer.cancel();
        self.shared.advance();
        self.shared.state.send_modify(|s| {
            s.text.clear();
            s.suggestions.clear();
            s.panel_open = false;
            s.phase = Phase::Idle;
        });
    }

    pub fn clear_recent(&self) {
        self.recent.clear();
        self.shared.state.send_modify(|s| s.recent.clear());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::client::fake::FakeApi;
    use crate::client::storage::MemoryStore;

    fn controller(api: &Arc<FakeApi>) -> (SearchController, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let api: Arc<dyn SearchApi> = Arc::clone(api) as Arc<dyn SearchApi>;
        let store_dyn: Arc<dyn KeyValueStore> = Arc::clone(&store) as Arc<dyn KeyValueStore>;
        (SearchController::new(api, store_dyn), store)
    }

    async fn wait(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_waits_for_last_keystroke() {
        let api = Arc::new(FakeApi::default());
        let (mut widget, _) = controller(&api);

        widget.input("ze");
        wait(50).await;
        widget.input("zel");
        wait(50).await;
        widget.input("zelda");
        assert_eq!(widget.state().phase, Phase::Typing);

        wait(299).await;
        assert!(api.calls().await.is_empty());

        wait(20).await;
        assert_eq!(api.calls().await, vec!["zelda"]);
        let state = widget.state();
        assert_eq!(state.phase, Phase::DisplayingSuggestions);
        assert_eq!(state.suggestions, vec!["zelda result"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        let api = Arc::new(FakeApi::default());
        let (mut widget, _) = controller(&api);

        widget.input("slow query");
        wait(350).await;
        assert_eq!(widget.state().phase, Phase::FetchingSuggestions);

        widget.input("fast query");
        wait(400).await;
        assert_eq!(widget.state().suggestions, vec!["fast query result"]);

        wait(500).await;
        assert_eq!(api.calls().await, vec!["slow query", "fast query"]);
        assert_eq!(widget.state().suggestions, vec!["fast query result"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_input_does_not_fetch() {
        let api = Arc::new(FakeApi::default());
        let (mut widget, _) = controller(&api);

        widget.input("a");
        wait(1000).await;
        assert!(api.calls().await.is_empty());
        assert_eq!(widget.state().phase, Phase::Idle);
        assert!(widget.state().panel_open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_shows_empty_list() {
        let api = Arc::new(FakeApi::default());
        api.fail(true);
        let (mut widget, _) = controller(&api);

        widget.input("zelda");
        wait(400).await;
        let state = widget.state();
        assert!(state.suggestions.is_empty());
        assert_eq!(state.phase, Phase::DisplayingSuggestions);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_records_and_navigates() {
        let api = Arc::new(FakeApi::default());
        let (mut widget, store) = controller(&api);

        widget.input("  block puzzles ");
        let outcome = widget.key(Key::Enter);
        assert_eq!(
            outcome,
            SubmitOutcome::Navigate("/search?q=block%20puzzles".to_string())
        );

        let state = widget.state();
        assert!(!state.panel_open);
        assert_eq!(state.phase, Phase::Navigated);
        assert_eq!(state.recent, vec!["block puzzles"]);
        assert!(store.get(crate::client::recent::STORAGE_KEY).is_some());

        wait(1000).await;
        assert!(api.calls().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_submit_is_ignored() {
        let api = Arc::new(FakeApi::default());
        let (mut widget, _) = controller(&api);

        widget.input("   ");
        assert_eq!(widget.submit(), SubmitOutcome::Ignored);
        assert!(widget.state().recent.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_callback() {
        let api = Arc::new(FakeApi::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let (widget, _) = controller(&api);
        let mut widget = widget.with_on_submit(move |q| {
            if let Ok(mut queries) = sink.lock() {
                queries.push(q.to_string());
            }
        });

        assert_eq!(widget.select("chess"), SubmitOutcome::Delivered);
        let delivered = seen.lock().map(|q| q.clone()).unwrap_or_default();
        assert_eq!(delivered, vec!["chess"]);
        assert_eq!(widget.state().text, "chess");
    }

    #[tokio::test(start_paused = true)]
    async fn test_escape_keeps_text() {
        let api = Arc::new(FakeApi::default());
        let (mut widget, _) = controller(&api);

        widget.input("tetris");
        assert_eq!(widget.key(Key::Escape), SubmitOutcome::Ignored);
        let state = widget.state();
        assert_eq!(state.text, "tetris");
        assert!(!state.panel_open);
        assert!(!state.focused);

        wait(1000).await;
        assert!(api.calls().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_outside_pointer_closes_panel() {
        let api = Arc::new(FakeApi::default());
        let (widget, _) = controller(&api);

        widget.focus();
        widget.pointer_down(true);
        assert!(widget.state().panel_open);
        widget.pointer_down(false);
        assert!(!widget.state().panel_open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_keeps_focus() {
        let api = Arc::new(FakeApi::default());
        let (mut widget, _) = controller(&api);

        widget.input("tetris");
        widget.clear();
        let state = widget.state();
        assert!(state.text.is_empty());
        assert!(state.focused);
        assert!(!state.panel_open);

        widget.clear_recent();
        assert!(widget.state().recent.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_trending_is_cached() {
        let api = Arc::new(FakeApi::with_trending(&["snake", "chess"]));
        let (widget, store) = controller(&api);

        widget.load_trending().await;
        assert_eq!(widget.state().trending, vec!["snake", "chess"]);

        api.fail(true);
        let store_dyn: Arc<dyn KeyValueStore> = store;
        let api_dyn: Arc<dyn SearchApi> = Arc::clone(&api) as Arc<dyn SearchApi>;
        let reopened = SearchController::new(api_dyn, store_dyn);
        reopened.load_trending().await;
        assert_eq!(reopened.state().trending, vec!["snake", "chess"]);
    }
}
