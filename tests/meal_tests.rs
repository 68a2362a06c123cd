// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meal logging and daily progress tests.

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{body_json, complete_profile, create_test_app, unique_user_id, user_request};
use diet_planner::services::CreatePlanOptions;

fn meal(date: &str, meal_type: &str, calories: f64, protein: f64) -> serde_json::Value {
    json!({
        "date": date,
        "meal_type": meal_type,
        "items": [{
            "name": "Chicken and rice",
            "calories": calories,
            "macros": { "protein": protein, "carbs": 60, "fats": 10 }
        }]
    })
}

#[tokio::test]
async fn test_log_list_and_delete_meal() {
    let (app, _state) = create_test_app();
    let user_id = unique_user_id();

    let response = app
        .clone()
        .oneshot(user_request(
            "POST",
            "/api/meals",
            &user_id,
            Some(meal("2026-03-10", "lunch", 600.0, 40.0)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let logged = body_json(response).await;
    let meal_id = logged["id"].as_str().unwrap().to_string();
    assert!(meal_id.starts_with("meal_"));

    let response = app
        .clone()
        .oneshot(user_request("GET", "/api/meals?date=2026-03-10", &user_id, None))
        .await
        .unwrap();
    let meals = body_json(response).await;
    assert_eq!(meals.as_array().unwrap().len(), 1);

    // Other days are separate
    let response = app
        .clone()
        .oneshot(user_request("GET", "/api/meals?date=2026-03-11", &user_id, None))
        .await
        .unwrap();
    assert!(body_json(response).await.as_array().unwrap().is_empty());

    // Another user cannot delete it
    let response = app
        .clone()
        .oneshot(user_request(
            "DELETE",
            &format!("/api/meals/{}", meal_id),
            &unique_user_id(),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(user_request(
            "DELETE",
            &format!("/api/meals/{}", meal_id),
            &user_id,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_meal_requires_items() {
    let (app, _state) = create_test_app();

    let response = app
        .oneshot(user_request(
            "POST",
            "/api/meals",
            &unique_user_id(),
            Some(json!({ "meal_type": "snack", "items": [] })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_meal_rejects_negative_calories() {
    let (app, _state) = create_test_app();

    let response = app
        .oneshot(user_request(
            "POST",
            "/api/meals",
            &unique_user_id(),
            Some(meal("2026-03-10", "dinner", -5.0, 10.0)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_date_query() {
    let (app, _state) = create_test_app();

    let response = app
        .oneshot(user_request("GET", "/api/progress?date=03/10/2026", &unique_user_id(), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_progress_without_plan() {
    let (app, _state) = create_test_app();
    let user_id = unique_user_id();

    app.clone()
        .oneshot(user_request(
            "POST",
            "/api/meals",
            &user_id,
            Some(meal("2026-03-10", "breakfast", 400.0, 20.0)),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(user_request("GET", "/api/progress?date=2026-03-10", &user_id, None))
        .await
        .unwrap();
    let progress = body_json(response).await;

    assert_eq!(progress["meal_count"], 1);
    assert_eq!(progress["consumed"]["calories"], 400.0);
    assert!(progress["targets"].is_null());
    assert!(progress["remaining_calories"].is_null());
}

#[tokio::test]
async fn test_progress_against_active_plan() {
    let (app, state) = create_test_app();
    let user_id = unique_user_id();
    state
        .store
        .upsert_profile(&complete_profile(&user_id))
        .await
        .unwrap();
    state
        .plan_service
        .create_plan_for_user(&user_id, CreatePlanOptions::default())
        .await
        .unwrap();

    for (meal_type, calories) in [("breakfast", 559.0), ("lunch", 700.0)] {
        app.clone()
            .oneshot(user_request(
                "POST",
                "/api/meals",
                &user_id,
                Some(meal("2026-03-10", meal_type, calories, 44.0)),
            ))
            .await
            .unwrap();
    }

    let response = app
        .oneshot(user_request("GET", "/api/progress?date=2026-03-10", &user_id, None))
        .await
        .unwrap();
    let progress = body_json(response).await;

    assert_eq!(progress["meal_count"], 2);
    assert_eq!(progress["consumed"]["calories"], 1259.0);
    assert_eq!(progress["targets"]["calories"], 2259.0);
    assert_eq!(progress["remaining_calories"], 1000.0);
    assert_eq!(progress["progress"]["protein"], 50.0);
}
