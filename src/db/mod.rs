// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer: the store contract and its backends (Firestore, in-memory).

pub mod firestore;
pub mod memory;
pub mod records;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{MealLog, NutritionPlan, PlanUpdate, UserProfile};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

/// Collection names as constants.
pub mod collections {
    pub const PROFILES: &str = "profiles";
    pub const NUTRITION_PLANS: &str = "nutrition_plans";
    pub const MEAL_LOGS: &str = "meal_logs";
}

/// Shared handle to whichever backend is configured.
pub type Store = Arc<dyn NutritionStore>;

/// Durable keyed storage for profiles, plans and meal logs.
///
/// Backend failures are reported as [`AppError::Database`] and passed through
/// to callers unchanged.
#[async_trait]
pub trait NutritionStore: Send + Sync {
    // ─── Profiles ────────────────────────────────────────────────

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AppError>;

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), AppError>;

    // ─── Nutrition Plans ─────────────────────────────────────────

    async fn create_plan(&self, plan: &NutritionPlan) -> Result<(), AppError>;

    async fn update_plan(&self, plan_id: &str, update: &PlanUpdate) -> Result<(), AppError>;

    /// The user's active plan, if any.
    async fn get_active_plan(&self, user_id: &str) -> Result<Option<NutritionPlan>, AppError>;

    /// Every plan for the user, active and historical, newest first.
    async fn get_all_plans(&self, user_id: &str) -> Result<Vec<NutritionPlan>, AppError>;

    async fn deactivate_all_plans(&self, user_id: &str) -> Result<(), AppError>;

    /// Deactivate the owner's plans and insert `plan` as the active one.
    ///
    /// Backends override this to make the two writes atomic.
    async fn activate_plan(&self, plan: &NutritionPlan) -> Result<(), AppError> {
        self.deactivate_all_plans(&plan.user_id).await?;
        self.create_plan(plan).await
    }

    // ─── Meal Logs ───────────────────────────────────────────────

    async fn create_meal_log(&self, log: &MealLog) -> Result<(), AppError>;

    /// Meal logs for one day, newest first.
    async fn get_meal_logs(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<MealLog>, AppError>;

    /// Returns `false` when no log with that id belongs to the user.
    async fn delete_meal_log(&self, user_id: &str, meal_id: &str) -> Result<bool, AppError>;
}

/// Ordering used for plan history: latest start date, then latest write.
pub(crate) fn newest_plan_first(a: &NutritionPlan, b: &NutritionPlan) -> std::cmp::Ordering {
    b.start_date
        .cmp(&a.start_date)
        .then_with(|| b.created_at.cmp(&a.created_at))
}
