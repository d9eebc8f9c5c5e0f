use std::fmt::Write as _;

use async_trait::async_trait;
use serde::Deserialize;

use crate::catalog::PageMeta;

/// Operations the search widget needs from the catalog API.
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// `GET /search/suggestions`
    async fn suggestions(&self, partial: &str) -> anyhow::Result<Vec<String>>;

    /// `GET /search/trending`
    async fn trending(&self, limit: u64) -> anyhow::Result<Vec<String>>;

    /// `GET /search`
    async fn search(&self, request: &SearchRequest) -> anyhow::Result<SearchResults>;
}

/// Parameters of one results-page request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub category: Option<i32>,
    pub min_rating: Option<f64>,
    pub sort_by: Option<String>,
    pub page: u64,
    pub limit: u64,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            category: None,
            min_rating: None,
            sort_by: None,
            page: 1,
            limit: crate::catalog::pagination::DEFAULT_LIMIT,
        }
    }

    /// Encoded query string, without the leading `?`.
    #[must_use]
    pub fn query_string(&self) -> String {
        let mut out = format!("q={}", urlencoding::encode(&self.query));
        if let Some(category) = self.category {
            let _ = write!(out, "&category={category}");
        }
        if let Some(min_rating) = self.min_rating {
            let _ = write!(out, "&minRating={min_rating}");
        }
        if let Some(sort_by) = &self.sort_by {
            let _ = write!(out, "&sortBy={}", urlencoding::encode(sort_by));
        }
        let _ = write!(out, "&page={}&limit={}", self.page, self.limit);
        out
    }
}

/// The slice of a game the results grid renders.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameCard {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub thumbnail: String,
    pub rating: Option<f64>,
    pub play_count: i64,
}

/// Body of `GET /search`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResults {
    pub games: Vec<GameCard>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    pub total: u64,
    pub pagination: PageMeta,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// [`SearchApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSearchApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSearchApi {
    /// `base_url` is the API root, e.g. `http://localhost:3000/api/v1`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T>(&self, path_and_query: &str) -> anyhow::Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{path_and_query}", self.base_url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Request to {url} failed: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(anyhow::anyhow!("Request failed ({status}): {message}"));
        }

        resp.json::<T>()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse response from {url}: {e}"))
    }
}

#[async_trait]
impl SearchApi for HttpSearchApi {
    async fn suggestions(&self, partial: &str) -> anyhow::Result<Vec<String>> {
        self.get_json(&format!(
            "/search/suggestions?q={}",
            urlencoding::encode(partial)
        ))
        .await
    }

    async fn trending(&self, limit: u64) -> anyhow::Result<Vec<String>> {
        self.get_json(&format!("/search/trending?limit={limit}"))
            .await
    }

    async fn search(&self, request: &SearchRequest) -> anyhow::Result<SearchResults> {
        self.get_json(&format!("/search?{}", request.query_string()))
            .await
    }
}

/// Path the widget navigates to when no submit callback is installed.
#[must_use]
pub fn results_path(query: &str) -> String {
    format!("/search?q={}", urlencoding::encode(query))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string() {
        let mut request = SearchRequest::new("space & time");
        assert_eq!(request.query_string(), "q=space%20%26%20time&page=1&limit=12");

        request.category = Some(3);
        request.min_rating = Some(4.5);
        request.sort_by = Some("rating".to_string());
        request.page = 2;
        assert_eq!(
            request.query_string(),
            "q=space%20%26%20time&category=3&minRating=4.5&sortBy=rating&page=2&limit=12"
        );
    }

    #[test]
    fn test_results_path() {
        assert_eq!(results_path("block puzzles"), "/search?q=block%20puzzles");
    }

    #[test]
    fn test_results_parse() {
        let body = r#"{
            "games": [{"id": 1, "title": "Tetra", "slug": "tetra", "thumbnail": "https://cdn/t.png",
                       "rating": 4.5, "playCount": 10, "views": 3}],
            "suggestions": [],
            "total": 1,
            "pagination": {"page": 1, "limit": 12, "total": 1, "totalPages": 1,
                           "hasNext": false, "hasPrev": false},
            "searchInfo": {"query": "tetra"}
        }"#;
        let parsed: Option<SearchResults> = serde_json::from_str(body).ok();
        assert_eq!(parsed.as_ref().map(|r| r.total), Some(1));
        assert_eq!(
            parsed.and_then(|r| r.games.first().map(|g| g.play_count)),
            Some(10)
        );
    }
}
