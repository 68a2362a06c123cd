// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for profiles, plans, meals and progress.

use crate::error::{AppError, Result};
use crate::middleware::DeviceUser;
use crate::models::{
    ActivityLevel, CustomMacroRatios, Goal, MealLog, NewMealLog, NutritionPlan, Sex, UserProfile,
};
use crate::services::meals::DailyProgress;
use crate::services::plans::{CreatePlanOptions, NutritionPlanWithCalculation, NutritionStats};
use crate::time_utils::{now_rfc3339, parse_date, today_utc};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// API routes (require `X-User-Id`).
/// The user middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/profile", get(get_profile).put(put_profile))
        .route("/api/plan", get(get_plan).post(create_plan))
        .route("/api/plan/recalculate", post(recalculate_plan))
        .route("/api/plan/macros", put(update_macros))
        .route("/api/plan/history", get(plan_history))
        .route("/api/meals", get(list_meals).post(log_meal))
        .route("/api/meals/{id}", delete(delete_meal))
        .route("/api/progress", get(daily_progress))
}

/// Optional `?date=YYYY-MM-DD`, defaulting to today.
#[derive(Deserialize)]
struct DateQuery {
    date: Option<String>,
}

impl DateQuery {
    fn resolve(&self) -> Result<NaiveDate> {
        match self.date.as_deref() {
            None => Ok(today_utc()),
            Some(raw) => parse_date(raw)
                .ok_or_else(|| AppError::BadRequest(format!("Invalid date {:?}", raw))),
        }
    }
}

/// Each provided percentage must be within 0-100.
fn check_ratio_range(ratios: &CustomMacroRatios) -> Result<()> {
    let all = [
        ("protein_percentage", ratios.protein_percentage),
        ("carbs_percentage", ratios.carbs_percentage),
        ("fats_percentage", ratios.fats_percentage),
    ];
    for (name, value) in all {
        if let Some(v) = value {
            if !(0.0..=100.0).contains(&v) {
                return Err(AppError::BadRequest(format!(
                    "{} must be between 0 and 100",
                    name
                )));
            }
        }
    }
    Ok(())
}

// ─── Profile ─────────────────────────────────────────────────

/// Profile fields the app submits. Biometrics may be left out while the
/// user is still onboarding; plan calculation reports what is missing.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileInput {
    #[validate(range(exclusive_min = 0.0, max = 130.0))]
    pub age: Option<f64>,
    pub sex: Option<Sex>,
    #[validate(range(exclusive_min = 0.0, max = 300.0))]
    pub height_cm: Option<f64>,
    #[validate(range(exclusive_min = 0.0, max = 700.0))]
    pub weight_kg: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub goal: Option<Goal>,
    #[validate(range(exclusive_min = 0.0, max = 700.0))]
    pub target_weight_kg: Option<f64>,
    #[validate(length(max = 20))]
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<DeviceUser>,
) -> Result<Json<UserProfile>> {
    state
        .store
        .get_profile(&user.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("profile {}", user.user_id)))
}

/// Create or replace the caller's profile.
async fn put_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<DeviceUser>,
    Json(input): Json<ProfileInput>,
) -> Result<Json<UserProfile>> {
    input.validate()?;

    let now = now_rfc3339();
    let mut profile = state
        .store
        .get_profile(&user.user_id)
        .await?
        .unwrap_or_else(|| UserProfile::new(user.user_id.clone(), &now));

    profile.age = input.age;
    profile.sex = input.sex;
    profile.height_cm = input.height_cm;
    profile.weight_kg = input.weight_kg;
    profile.activity_level = input.activity_level;
    profile.goal = input.goal;
    profile.target_weight_kg = input.target_weight_kg;
    profile.dietary_restrictions = input.dietary_restrictions;
    profile.updated_at = now;

    state.store.upsert_profile(&profile).await?;
    tracing::info!(user_id = %user.user_id, "Profile saved");

    Ok(Json(profile))
}

// ─── Plans ───────────────────────────────────────────────────

/// Active plan plus display summary.
#[derive(Serialize)]
pub struct PlanResponse {
    #[serde(flatten)]
    pub details: NutritionPlanWithCalculation,
    pub stats: NutritionStats,
}

impl From<NutritionPlanWithCalculation> for PlanResponse {
    fn from(details: NutritionPlanWithCalculation) -> Self {
        let stats = NutritionStats::from(&details);
        Self { details, stats }
    }
}

/// Active plan, or `null` when there is none yet.
async fn get_plan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<DeviceUser>,
) -> Result<Json<Option<PlanResponse>>> {
    let details = state
        .plan_service
        .get_active_plan_with_details(&user.user_id)
        .await?;
    Ok(Json(details.map(PlanResponse::from)))
}

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub custom_ratios: Option<CustomMacroRatios>,
    pub start_date: Option<NaiveDate>,
    pub make_active: Option<bool>,
}

async fn create_plan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<DeviceUser>,
    Json(req): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<PlanResponse>)> {
    if let Some(ratios) = &req.custom_ratios {
        check_ratio_range(ratios)?;
    }

    let options = CreatePlanOptions {
        custom_ratios: req.custom_ratios,
        start_date: req.start_date,
        make_active: req.make_active.unwrap_or(true),
    };
    let details = state
        .plan_service
        .create_plan_for_user(&user.user_id, options)
        .await?;

    Ok((StatusCode::CREATED, Json(details.into())))
}

#[derive(Debug, Deserialize)]
pub struct RecalculateRequest {
    pub custom_ratios: Option<CustomMacroRatios>,
    #[serde(default)]
    pub force: bool,
}

async fn recalculate_plan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<DeviceUser>,
    Json(req): Json<RecalculateRequest>,
) -> Result<Json<PlanResponse>> {
    if let Some(ratios) = &req.custom_ratios {
        check_ratio_range(ratios)?;
    }

    let details = state
        .plan_service
        .recalculate_plan_if_needed(&user.user_id, req.custom_ratios, req.force)
        .await?;
    Ok(Json(details.into()))
}

async fn update_macros(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<DeviceUser>,
    Json(ratios): Json<CustomMacroRatios>,
) -> Result<Json<PlanResponse>> {
    check_ratio_range(&ratios)?;

    let details = state
        .plan_service
        .update_plan_macros(&user.user_id, ratios)
        .await?;
    Ok(Json(details.into()))
}

async fn plan_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<DeviceUser>,
) -> Result<Json<Vec<NutritionPlan>>> {
    Ok(Json(state.plan_service.plan_history(&user.user_id).await?))
}

// ─── Meals ───────────────────────────────────────────────────

async fn list_meals(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<DeviceUser>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<MealLog>>> {
    let date = query.resolve()?;
    Ok(Json(
        state.meal_service.meals_for_day(&user.user_id, date).await?,
    ))
}

async fn log_meal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<DeviceUser>,
    Json(input): Json<NewMealLog>,
) -> Result<(StatusCode, Json<MealLog>)> {
    let log = state.meal_service.log_meal(&user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

async fn delete_meal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<DeviceUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.meal_service.delete_meal(&user.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn daily_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<DeviceUser>,
    Query(query): Query<DateQuery>,
) -> Result<Json<DailyProgress>> {
    let date = query.resolve()?;
    Ok(Json(
        state.meal_service.daily_progress(&user.user_id, date).await?,
    ))
}
