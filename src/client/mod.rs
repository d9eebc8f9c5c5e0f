//! Client-side search widget logic.
//!
//! [`SearchController`] owns the debounce timer and the suggestion panel state,
//! [`ResultsView`] drives the results grid. Both talk to the API through the
//! [`SearchApi`] trait and publish their state on `tokio::sync::watch` channels.

pub mod api;
pub mod controller;
pub mod debounce;
pub mod recent;
pub mod results;
pub mod storage;

#[cfg(test)]
mod fake;

pub use api::{HttpSearchApi, SearchApi, SearchRequest, SearchResults};
pub use controller::{Key, Phase, SearchController, SubmitOutcome, WidgetState};
pub use debounce::Debouncer;
pub use recent::RecentSearches;
pub use results::{ResultsState, ResultsView};
pub use storage::{KeyValueStore, MemoryStore};
