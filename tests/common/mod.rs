#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection};
use serde_json::Value;
use tower::ServiceExt;

use playdeck_api::auth::jwt::generate_access_token;
use playdeck_api::catalog::slug::slugify;
use playdeck_api::config::{Config, Environment};
use playdeck_api::entities::{category, game};
use playdeck_api::state::AppState;

pub const JWT_SECRET: &str = "test-secret-key-for-testing-only-32chars";

/// Router plus a handle on its database for seeding and assertions.
pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = sea_orm::Database::connect("sqlite::memory:")
            .await
            .unwrap_or_default();
        Migrator::up(&db, None).await.unwrap_or_default();

        let state = AppState {
            db: db.clone(),
            config: Config {
                database_url: String::new(),
                server_host: std::net::IpAddr::from([127, 0, 0, 1]),
                server_port: 0,
                environment: Environment::Development,
                log_level: "warn".to_string(),
                jwt_secret: JWT_SECRET.to_string(),
                frontend_url: "http://localhost:5173".to_string(),
            },
        };

        Self {
            router: playdeck_api::routes::router().with_state(state),
            db,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        send(&self.router, "GET", uri, None, None).await
    }

    pub async fn get_as(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        send(&self.router, "GET", uri, None, Some(token)).await
    }

    pub async fn post(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        send(&self.router, "POST", uri, Some(body), None).await
    }

    pub async fn post_as(&self, uri: &str, body: &Value, token: &str) -> (StatusCode, Value) {
        send(&self.router, "POST", uri, Some(body), Some(token)).await
    }

    pub async fn put_as(&self, uri: &str, body: &Value, token: &str) -> (StatusCode, Value) {
        send(&self.router, "PUT", uri, Some(body), Some(token)).await
    }

    pub async fn patch_as(&self, uri: &str, body: &Value, token: &str) -> (StatusCode, Value) {
        send(&self.router, "PATCH", uri, Some(body), Some(token)).await
    }

    pub async fn delete_as(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        send(&self.router, "DELETE", uri, None, Some(token)).await
    }
}

/// Send a request and return (status, parsed JSON body). Non-JSON bodies parse as `Null`.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<&Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap_or_default();

    let response = app.clone().oneshot(request).await.unwrap_or_default();

    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .unwrap_or_default();
    let json = serde_json::from_slice(&bytes).unwrap_or_default();

    (status, json)
}

pub fn staff_token() -> String {
    generate_access_token("staff-1", "ADMIN", 900, JWT_SECRET).unwrap_or_default()
}

pub fn player_token() -> String {
    generate_access_token("player-1", "USER", 900, JWT_SECRET).unwrap_or_default()
}

pub async fn seed_category(db: &DatabaseConnection, name: &str, sort_order: i32) -> category::Model {
    let now = chrono::Utc::now();
    category::ActiveModel {
        name: ActiveValue::Set(name.to_string()),
        slug: ActiveValue::Set(slugify(name)),
        description: ActiveValue::Set(None),
        icon: ActiveValue::Set(None),
        sort_order: ActiveValue::Set(sort_order),
        is_active: ActiveValue::Set(true),
        created_at: ActiveValue::Set(now.into()),
        updated_at: ActiveValue::Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap_or_else(|_| empty_category())
}

/// Insert an ACTIVE game, letting `tweak` adjust any column first.
pub async fn seed_game(
    db: &DatabaseConnection,
    category_id: i32,
    title: &str,
    tweak: impl FnOnce(&mut game::ActiveModel),
) -> game::Model {
    let now = chrono::Utc::now();
    let mut model = game::ActiveModel {
        title: ActiveValue::Set(title.to_string()),
        slug: ActiveValue::Set(slugify(title)),
        description: ActiveValue::Set(format!("{title} is a browser game.")),
        long_description: ActiveValue::Set(None),
        thumbnail: ActiveValue::Set("https://cdn.example.com/thumb.png".to_string()),
        screenshots: ActiveValue::Set("[]".to_string()),
        category_id: ActiveValue::Set(category_id),
        tags: ActiveValue::Set("[]".to_string()),
        play_count: ActiveValue::Set(0),
        views: ActiveValue::Set(0),
        rating: ActiveValue::Set(None),
        review_count: ActiveValue::Set(0),
        developer: ActiveValue::Set(None),
        file_url: ActiveValue::Set(None),
        game_url: ActiveValue::Set(None),
        is_featured: ActiveValue::Set(false),
        status: ActiveValue::Set("ACTIVE".to_string()),
        created_at: ActiveValue::Set(now.into()),
        updated_at: ActiveValue::Set(now.into()),
        ..Default::default()
    };
    tweak(&mut model);
    model.insert(db).await.unwrap_or_else(|_| empty_game())
}

fn empty_category() -> category::Model {
    let now = chrono::Utc::now().into();
    category::Model {
        id: 0,
        name: String::new(),
        slug: String::new(),
        description: None,
        icon: None,
        sort_order: 0,
        is_active: false,
        created_at: now,
        updated_at: now,
    }
}

fn empty_game() -> game::Model {
    let now = chrono::Utc::now().into();
    game::Model {
        id: 0,
        title: String::new(),
        slug: String::new(),
        description: String::new(),
        long_description: None,
        thumbnail: String::new(),
        screenshots: String::new(),
        category_id: 0,
        tags: String::new(),
        play_count: 0,
        views: 0,
        rating: None,
        review_count: 0,
        developer: None,
        file_url: None,
        game_url: None,
        is_featured: false,
        status: String::new(),
        created_at: now,
        updated_at: now,
    }
}

/// Titles of the `games` array in a listing body, in response order.
pub fn titles(body: &Value) -> Vec<String> {
    body["games"]
        .as_array()
        .map(|games| {
            games
                .iter()
                .filter_map(|g| g["title"].as_str().map(ToString::to_string))
                .collect()
        })
        .unwrap_or_default()
}
