// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use diet_planner::config::Config;
use diet_planner::db::{FirestoreDb, MemoryDb, Store};
use diet_planner::models::{ActivityLevel, Goal, Sex, UserProfile};
use diet_planner::routes::create_router;
use diet_planner::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Unique user id for test isolation.
#[allow(dead_code)]
pub fn unique_user_id() -> String {
    format!("test_{}", uuid::Uuid::new_v4().simple())
}

/// The reference profile: 30 y/o male, 180 cm, 80 kg, moderately active,
/// losing weight. Calculates to 2259 kcal / 176 P / 247 C / 63 F.
#[allow(dead_code)]
pub fn complete_profile(user_id: &str) -> UserProfile {
    let mut profile = UserProfile::new(user_id, "2026-01-01T00:00:00.000Z");
    profile.age = Some(30.0);
    profile.sex = Some(Sex::Male);
    profile.height_cm = Some(180.0);
    profile.weight_kg = Some(80.0);
    profile.activity_level = Some(ActivityLevel::ModeratelyActive);
    profile.goal = Some(Goal::Lose);
    profile
}

/// App state on an in-memory store with mocked food analysis.
#[allow(dead_code)]
pub fn create_test_state() -> Arc<AppState> {
    let store: Store = Arc::new(MemoryDb::new());
    Arc::new(AppState::new(Config::test_default(), store))
}

/// Create a test app on a fresh in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = create_test_state();
    (create_router(state.clone()), state)
}

/// Build a request acting as `user_id`, with an optional JSON body.
#[allow(dead_code)]
pub fn user_request(
    method: &str,
    uri: &str,
    user_id: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("X-User-Id", user_id);

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
