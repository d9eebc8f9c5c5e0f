//! Scripted [`SearchApi`] for controller and results tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::api::{GameCard, SearchApi, SearchRequest, SearchResults};
use crate::catalog::Page;

/// Queries starting with `slow` answer after 500 ms, everything else after 10 ms.
/// The query `none` matches nothing.
#[derive(Debug, Default)]
pub struct FakeApi {
    pub calls: Mutex<Vec<String>>,
    pub failing: AtomicBool,
    pub trending: Vec<String>,
}

impl FakeApi {
    pub fn with_trending(trending: &[&str]) -> Self {
        Self {
            trending: trending.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    async fn respond(&self, call: String, query: &str) -> anyhow::Result<()> {
        self.calls.lock().await.push(call);
        let delay = if query.starts_with("slow") { 500 } else { 10 };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Request failed (500 Internal Server Error): boom"));
        }
        Ok(())
    }
}

#[async_trait]
impl SearchApi for FakeApi {
    async fn suggestions(&self, partial: &str) -> anyhow::Result<Vec<String>> {
        self.respond(partial.to_string(), partial).await?;
        Ok(vec![format!("{partial} result")])
    }

    async fn trending(&self, limit: u64) -> anyhow::Result<Vec<String>> {
        self.respond(format!("trending:{limit}"), "").await?;
        Ok(self.trending.clone())
    }

    async fn search(&self, request: &SearchRequest) -> anyhow::Result<SearchResults> {
        self.respond(format!("search:{}", request.query), &request.query)
            .await?;
        let page = Page::default();
        if request.query == "none" {
            return Ok(SearchResults {
                games: Vec::new(),
                suggestions: vec!["Ninjutsu Master".to_string()],
                total: 0,
                pagination: page.meta(0),
            });
        }
        Ok(SearchResults {
            games: vec![GameCard {
                id: 1,
                title: request.query.clone(),
                slug: request.query.clone(),
                thumbnail: "https://cdn.example.com/1.png".to_string(),
                rating: Some(4.0),
                play_count: 7,
            }],
            suggestions: Vec::new(),
            total: 1,
            pagination: page.meta(1),
        })
    }
}
