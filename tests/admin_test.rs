mod common;

use axum::http::StatusCode;
use sea_orm::ActiveValue;

use common::{TestApp, seed_category, seed_game, staff_token};

#[tokio::test]
async fn dashboard_requires_staff() {
    let app = TestApp::new().await;

    let (status, _) = app.get("/api/v1/admin/stats").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .get_as("/api/v1/admin/stats", &common::player_token())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn dashboard_totals() {
    let app = TestApp::new().await;
    let arcade = seed_category(&app.db, "Arcade", 0).await;
    seed_category(&app.db, "Puzzle", 1).await;
    seed_game(&app.db, arcade.id, "Pong", |g| {
        g.play_count = ActiveValue::Set(40);
        g.views = ActiveValue::Set(100);
    })
    .await;
    seed_game(&app.db, arcade.id, "Breakout", |g| {
        g.play_count = ActiveValue::Set(60);
        g.views = ActiveValue::Set(10);
        g.status = ActiveValue::Set("INACTIVE".to_string());
    })
    .await;
    app.get("/api/v1/search?q=pong").await;

    let (status, body) = app.get_as("/api/v1/admin/stats", &staff_token()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["totals"]["games"], 2);
    assert_eq!(body["totals"]["activeGames"], 1);
    assert_eq!(body["totals"]["categories"], 2);
    assert_eq!(body["totals"]["plays"], 100);
    assert_eq!(body["totals"]["views"], 110);
    assert_eq!(body["totals"]["recentSearches"], 1);
    assert_eq!(body["topGames"][0]["title"], "Breakout");
    assert_eq!(body["recentGames"].as_array().map(Vec::len), Some(2));
}
