use axum::Json;
use axum::body::Body;
use axum::extract::Request;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Unified application error type that maps to JSON HTTP responses.
///
/// Every error renders as `{ "error": { "code": "...", "message": "..." } }`.
#[derive(Debug)]
pub enum AppError {
    /// 400 with code `VALIDATION_ERROR`: malformed or out-of-range input
    Validation(String),
    /// 400 with a domain-specific code, e.g. `CATEGORY_HAS_GAMES`
    Rejected(&'static str, String),
    /// 401 Unauthorized
    Unauthorized(String),
    /// 403 Forbidden
    Forbidden(String),
    /// 404 with a resource-specific code, e.g. `GAME_NOT_FOUND`
    NotFound(&'static str, String),
    /// 500 Internal Server Error (wraps any error, logs details, returns generic message)
    Internal(anyhow::Error),
}

/// Underlying error text of a 500 response, attached as a response extension so
/// [`expose_internal_details`] can surface it in development.
#[derive(Debug, Clone)]
pub struct InternalDetail(pub String);

impl AppError {
    /// Shorthand for a `VALIDATION_ERROR`.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Rejected(..) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(..) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut detail = None;
        let (code, message) = match self {
            Self::Validation(msg) => ("VALIDATION_ERROR", msg),
            Self::Rejected(code, msg) | Self::NotFound(code, msg) => (code, msg),
            Self::Unauthorized(msg) => ("UNAUTHORIZED", msg),
            Self::Forbidden(msg) => ("FORBIDDEN", msg),
            Self::Internal(err) => {
                // Emitted inside the request span, which carries method and URI
                tracing::error!("Internal server error: {err:#}");
                detail = Some(InternalDetail(format!("{err:#}")));
                ("INTERNAL_ERROR", "An internal error occurred".to_string())
            }
        };

        let mut response = (
            status,
            Json(json!({
                "error": {
                    "code": code,
                    "message": message,
                }
            })),
        )
            .into_response();

        if let Some(detail) = detail {
            response.extensions_mut().insert(detail);
        }
        response
    }
}

/// Allow `?` to automatically convert any `anyhow::Error` into `AppError::Internal`.
impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}

/// Response middleware for development builds: rewrite 500 bodies to include the
/// underlying error text under `error.details`.
pub async fn expose_internal_details(response: Response) -> Response {
    let Some(InternalDetail(detail)) = response.extensions().get::<InternalDetail>().cloned()
    else {
        return response;
    };

    let (mut parts, _) = response.into_parts();
    let body = json!({
        "error": {
            "code": "INTERNAL_ERROR",
            "message": "An internal error occurred",
            "details": detail,
        }
    });
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(body.to_string()))
}

/// Largest request body buffered for failure logs, the same as axum's default
/// body limit.
const LOGGED_BODY_LIMIT: usize = 2 * 1024 * 1024;
/// Characters of the body written to a log line.
const LOGGED_BODY_EXCERPT: usize = 1024;

/// Request middleware: keep a copy of the body and log it when the response is a
/// 500. Method and URI come from the enclosing `http_request` span.
pub async fn log_failed_request_body(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, LOGGED_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(err) => {
            return AppError::validation(format!("Unreadable request body: {err}")).into_response();
        }
    };

    let response = next
        .run(Request::from_parts(parts, Body::from(bytes.clone())))
        .await;
    if response.status() == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(body = %body_excerpt(&bytes), "Request failed");
    }
    response
}

fn body_excerpt(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    if text.chars().count() <= LOGGED_BODY_EXCERPT {
        return text.into_owned();
    }
    let mut excerpt: String = text.chars().take(LOGGED_BODY_EXCERPT).collect();
    excerpt.push_str("...");
    excerpt
}

/// Unwrap a JSON body, turning a malformed or mistyped payload into a
/// `VALIDATION_ERROR` instead of axum's plain-text rejection.
///
/// # Errors
///
/// Returns `VALIDATION_ERROR` carrying the rejection text.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// Fallback handler for routes that do not exist.
pub async fn route_not_found(uri: axum::http::Uri) -> AppError {
    AppError::NotFound("ROUTE_NOT_FOUND", format!("Route {} not found", uri.path()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::validation("bad").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Rejected("CATEGORY_HAS_GAMES", String::new()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("GAME_NOT_FOUND", String::new()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_body_excerpt_truncates() {
        assert_eq!(body_excerpt(br#"{"name":"Pong"}"#), r#"{"name":"Pong"}"#);
        let long = "x".repeat(LOGGED_BODY_EXCERPT + 10);
        let excerpt = body_excerpt(long.as_bytes());
        assert_eq!(excerpt.len(), LOGGED_BODY_EXCERPT + 3);
        assert!(excerpt.ends_with("..."));
    }

    #[tokio::test]
    async fn test_logged_body_still_reaches_handler() {
        use axum::Router;
        use axum::routing::post;
        use http_body_util::BodyExt;
        use tower::ServiceExt;

        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .route(
                "/fail",
                post(|| async { AppError::Internal(anyhow::anyhow!("db down")) }),
            )
            .layer(axum::middleware::from_fn(log_failed_request_body));

        let request = axum::http::Request::post("/echo")
            .body(Body::from("hello"))
            .unwrap_or_default();
        let response = app.clone().oneshot(request).await.unwrap_or_default();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response
            .into_body()
            .collect()
            .await
            .map(http_body_util::Collected::to_bytes)
            .unwrap_or_default();
        assert_eq!(&bytes[..], b"hello");

        let request = axum::http::Request::post("/fail")
            .body(Body::from(r#"{"ids":[1]}"#))
            .unwrap_or_default();
        let response = app.oneshot(request).await.unwrap_or_default();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_detail_attached_only_to_500() {
        let response = AppError::Internal(anyhow::anyhow!("disk full")).into_response();
        let detail = response.extensions().get::<InternalDetail>();
        assert_eq!(detail.map(|d| d.0.as_str()), Some("disk full"));

        let response = AppError::validation("q is required").into_response();
        assert!(response.extensions().get::<InternalDetail>().is_none());
    }
}
