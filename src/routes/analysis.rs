// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Food photo analysis route.

use crate::error::Result;
use crate::services::food_analysis::{FoodAnalysis, MAX_IMAGE_BYTES};
use crate::AppState;
use axum::{
    extract::{DefaultBodyLimit, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Base64 grows payloads by 4/3; leave room for the JSON wrapper.
const ANALYZE_BODY_LIMIT: usize = MAX_IMAGE_BYTES / 3 * 4 + 64 * 1024;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/meals/analyze",
        post(analyze_food).layer(DefaultBodyLimit::max(ANALYZE_BODY_LIMIT)),
    )
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Base64-encoded image bytes
    pub image_base64: String,
    /// Defaults to image/jpeg
    pub mime_type: Option<String>,
}

/// Estimate nutrition for a photo. The result is for the user to review
/// before it is logged as a meal.
async fn analyze_food(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<FoodAnalysis>> {
    let analysis = state
        .food_analyzer
        .analyze(&req.image_base64, req.mime_type.as_deref())
        .await?;
    Ok(Json(analysis))
}
