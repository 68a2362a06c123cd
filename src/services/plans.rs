// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plan lifecycle: create, look up, recalculate and re-split nutrition plans.
//!
//! A user has at most one active plan. Superseded plans are deactivated and
//! kept as history, except for macro edits which update the active row in
//! place. Every mutating operation for a user runs under that user's lock.

use crate::db::Store;
use crate::error::AppError;
use crate::models::{CustomMacroRatios, NutritionPlan, PlanUpdate, UserProfile};
use crate::services::calculator::{
    calculate_nutrition_plan, round_half_up, NutritionCalculationResult,
};
use crate::services::validator::{validate_nutrition_targets, ValidationError};
use crate::time_utils::{now_rfc3339, today_utc};
use chrono::NaiveDate;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Plans at least this many days old are due for recalculation.
pub const DEFAULT_STALE_PLAN_DAYS: i64 = 7;

/// Allowed distance of a ratio sum from 100%.
const RATIO_SUM_TOLERANCE: f64 = 0.1;

/// Per-user locks serializing plan mutations.
pub type PlanLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Options for [`PlanService::create_plan_for_user`].
#[derive(Debug, Clone)]
pub struct CreatePlanOptions {
    pub custom_ratios: Option<CustomMacroRatios>,
    /// Defaults to today (UTC)
    pub start_date: Option<NaiveDate>,
    pub make_active: bool,
}

impl Default for CreatePlanOptions {
    fn default() -> Self {
        Self {
            custom_ratios: None,
            start_date: None,
            make_active: true,
        }
    }
}

/// A plan together with a fresh calculation from the current profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionPlanWithCalculation {
    #[serde(flatten)]
    pub plan: NutritionPlan,
    pub calculation: NutritionCalculationResult,
    pub validation_errors: Vec<ValidationError>,
}

/// Display strings for a plan summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub struct NutritionStats {
    /// Rounded percentages, e.g. "30/40/30"
    pub macro_split: String,
    /// e.g. "150P / 200C / 67F"
    pub macro_grams: String,
    /// e.g. "2000 cal"
    pub daily_calories: String,
    pub has_warnings: bool,
}

impl From<&NutritionPlanWithCalculation> for NutritionStats {
    fn from(details: &NutritionPlanWithCalculation) -> Self {
        let plan = &details.plan;
        let calc = &details.calculation;
        Self {
            macro_split: format!(
                "{}/{}/{}",
                round_half_up(calc.protein_percentage),
                round_half_up(calc.carbs_percentage),
                round_half_up(calc.fats_percentage)
            ),
            macro_grams: format!(
                "{}P / {}C / {}F",
                plan.protein_grams, plan.carbs_grams, plan.fats_grams
            ),
            daily_calories: format!("{} cal", plan.daily_calories),
            has_warnings: !details.validation_errors.is_empty(),
        }
    }
}

/// Whether a plan that started on `start_date` is stale on `today`.
///
/// Exactly `stale_after_days` elapsed counts as stale. Plans dated in the
/// future are never stale.
pub fn is_stale(start_date: NaiveDate, today: NaiveDate, stale_after_days: i64) -> bool {
    (today - start_date).num_days() >= stale_after_days
}

/// [`is_stale`] with the default seven-day window.
pub fn needs_recalculation(start_date: NaiveDate, today: NaiveDate) -> bool {
    is_stale(start_date, today, DEFAULT_STALE_PLAN_DAYS)
}

fn new_plan_id() -> String {
    format!("plan_{}", uuid::Uuid::new_v4().simple())
}

/// Calculate and validate, rejecting the result on any violation.
fn calculate_validated(
    profile: &UserProfile,
    ratios: Option<&CustomMacroRatios>,
    reject: fn(Vec<ValidationError>) -> AppError,
) -> Result<NutritionCalculationResult, AppError> {
    let calculation = calculate_nutrition_plan(profile, ratios)?;
    let violations = validate_nutrition_targets(&calculation);
    if !violations.is_empty() {
        return Err(reject(violations));
    }
    Ok(calculation)
}

/// Plan lifecycle manager.
pub struct PlanService {
    store: Store,
    locks: PlanLocks,
    stale_after_days: i64,
}

impl PlanService {
    pub fn new(store: Store, stale_after_days: i64) -> Self {
        Self {
            store,
            locks: Arc::new(DashMap::new()),
            stale_after_days,
        }
    }

    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn load_profile(&self, user_id: &str) -> Result<UserProfile, AppError> {
        self.store
            .get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::ProfileNotFound(user_id.to_string()))
    }

    /// Whether `plan` is stale today under this service's window.
    pub fn plan_is_stale(&self, plan: &NutritionPlan) -> bool {
        is_stale(plan.start_date, today_utc(), self.stale_after_days)
    }

    /// Calculate, validate and persist a new plan for a user.
    ///
    /// With `make_active` (the default) every existing plan is deactivated in
    /// the same store operation that inserts the new one.
    pub async fn create_plan_for_user(
        &self,
        user_id: &str,
        options: CreatePlanOptions,
    ) -> Result<NutritionPlanWithCalculation, AppError> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        self.create_plan_locked(user_id, options).await
    }

    async fn create_plan_locked(
        &self,
        user_id: &str,
        options: CreatePlanOptions,
    ) -> Result<NutritionPlanWithCalculation, AppError> {
        let profile = self.load_profile(user_id).await?;
        let calculation = calculate_validated(
            &profile,
            options.custom_ratios.as_ref(),
            AppError::ValidationFailed,
        )?;

        let plan = NutritionPlan {
            id: new_plan_id(),
            user_id: user_id.to_string(),
            daily_calories: calculation.adjusted_calories,
            protein_grams: calculation.protein_grams,
            carbs_grams: calculation.carbs_grams,
            fats_grams: calculation.fats_grams,
            custom_ratios: options.custom_ratios,
            start_date: options.start_date.unwrap_or_else(today_utc),
            is_active: options.make_active,
            created_at: now_rfc3339(),
        };

        if options.make_active {
            self.store.activate_plan(&plan).await?;
        } else {
            self.store.create_plan(&plan).await?;
        }

        tracing::info!(
            user_id,
            plan_id = %plan.id,
            daily_calories = plan.daily_calories,
            active = plan.is_active,
            "Created nutrition plan"
        );

        Ok(NutritionPlanWithCalculation {
            plan,
            calculation,
            validation_errors: Vec::new(),
        })
    }

    /// The active plan with a calculation recomputed from the current profile.
    ///
    /// Returns `None` when the user has no active plan or no profile.
    pub async fn get_active_plan_with_details(
        &self,
        user_id: &str,
    ) -> Result<Option<NutritionPlanWithCalculation>, AppError> {
        let Some(plan) = self.store.get_active_plan(user_id).await? else {
            return Ok(None);
        };
        let Some(profile) = self.store.get_profile(user_id).await? else {
            tracing::debug!(user_id, "Active plan without profile");
            return Ok(None);
        };

        let calculation = calculate_nutrition_plan(&profile, plan.custom_ratios.as_ref())?;
        let validation_errors = validate_nutrition_targets(&calculation);

        Ok(Some(NutritionPlanWithCalculation {
            plan,
            calculation,
            validation_errors,
        }))
    }

    /// Replace the active plan if it is stale or `force` is set.
    ///
    /// Without an active plan this creates one. A fresh plan is returned
    /// unchanged. New ratios win over the ones stored on the current plan.
    pub async fn recalculate_plan_if_needed(
        &self,
        user_id: &str,
        custom_ratios: Option<CustomMacroRatios>,
        force: bool,
    ) -> Result<NutritionPlanWithCalculation, AppError> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let Some(current) = self.store.get_active_plan(user_id).await? else {
            tracing::debug!(user_id, "No active plan, creating one");
            let options = CreatePlanOptions {
                custom_ratios,
                ..Default::default()
            };
            return self.create_plan_locked(user_id, options).await;
        };

        if !force && !self.plan_is_stale(&current) {
            return self
                .get_active_plan_with_details(user_id)
                .await?
                .ok_or_else(|| AppError::ProfileNotFound(user_id.to_string()));
        }

        let profile = self.load_profile(user_id).await?;
        let ratios = custom_ratios.or(current.custom_ratios);
        let calculation =
            calculate_validated(&profile, ratios.as_ref(), AppError::RecalculationFailed)?;

        let plan = NutritionPlan {
            id: new_plan_id(),
            user_id: user_id.to_string(),
            daily_calories: calculation.adjusted_calories,
            protein_grams: calculation.protein_grams,
            carbs_grams: calculation.carbs_grams,
            fats_grams: calculation.fats_grams,
            custom_ratios: ratios,
            start_date: today_utc(),
            is_active: true,
            created_at: now_rfc3339(),
        };
        self.store.activate_plan(&plan).await?;

        tracing::info!(
            user_id,
            previous_plan_id = %current.id,
            plan_id = %plan.id,
            forced = force,
            "Recalculated nutrition plan"
        );

        Ok(NutritionPlanWithCalculation {
            plan,
            calculation,
            validation_errors: Vec::new(),
        })
    }

    /// Apply a new macro split to the active plan in place.
    ///
    /// The ratios must sum to 100 (within 0.1); this is checked before any
    /// store access.
    pub async fn update_plan_macros(
        &self,
        user_id: &str,
        ratios: CustomMacroRatios,
    ) -> Result<NutritionPlanWithCalculation, AppError> {
        let sum = ratios.sum();
        if (sum - 100.0).abs() > RATIO_SUM_TOLERANCE {
            return Err(AppError::RatioSumInvalid { sum });
        }

        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let mut plan = self
            .store
            .get_active_plan(user_id)
            .await?
            .ok_or_else(|| AppError::PlanNotFound(user_id.to_string()))?;
        let profile = self.load_profile(user_id).await?;
        let calculation = calculate_validated(&profile, Some(&ratios), AppError::ValidationFailed)?;

        let update = PlanUpdate {
            daily_calories: Some(calculation.adjusted_calories),
            protein_grams: Some(calculation.protein_grams),
            carbs_grams: Some(calculation.carbs_grams),
            fats_grams: Some(calculation.fats_grams),
            custom_ratios: Some(Some(ratios)),
            is_active: None,
        };
        self.store.update_plan(&plan.id, &update).await?;
        update.apply_to(&mut plan);

        tracing::info!(user_id, plan_id = %plan.id, "Updated plan macros");

        Ok(NutritionPlanWithCalculation {
            plan,
            calculation,
            validation_errors: Vec::new(),
        })
    }

    /// Every plan the user has had, newest first.
    pub async fn plan_history(&self, user_id: &str) -> Result<Vec<NutritionPlan>, AppError> {
        self.store.get_all_plans(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLevel, Goal, Sex};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_needs_recalculation_boundaries() {
        let today = day(2026, 5, 15);
        assert!(!needs_recalculation(today, today));
        assert!(!needs_recalculation(day(2026, 5, 9), today));
        assert!(needs_recalculation(day(2026, 5, 8), today));
        assert!(needs_recalculation(day(2026, 4, 1), today));
    }

    #[test]
    fn test_future_plan_is_not_stale() {
        assert!(!needs_recalculation(day(2026, 6, 1), day(2026, 5, 15)));
    }

    #[test]
    fn test_custom_window() {
        let today = day(2026, 5, 15);
        assert!(is_stale(day(2026, 5, 12), today, 3));
        assert!(!is_stale(day(2026, 5, 13), today, 3));
    }

    #[test]
    fn test_nutrition_stats_formatting() {
        let mut profile = UserProfile::new("u1", "2026-01-01T00:00:00.000Z");
        profile.age = Some(30.0);
        profile.sex = Some(Sex::Male);
        profile.height_cm = Some(180.0);
        profile.weight_kg = Some(80.0);
        profile.activity_level = Some(ActivityLevel::ModeratelyActive);
        profile.goal = Some(Goal::Lose);

        let calculation = calculate_nutrition_plan(&profile, None).unwrap();
        let details = NutritionPlanWithCalculation {
            plan: NutritionPlan {
                id: "plan_1".to_string(),
                user_id: "u1".to_string(),
                daily_calories: calculation.adjusted_calories,
                protein_grams: calculation.protein_grams,
                carbs_grams: calculation.carbs_grams,
                fats_grams: calculation.fats_grams,
                custom_ratios: None,
                start_date: day(2026, 1, 1),
                is_active: true,
                created_at: "2026-01-01T00:00:00.000Z".to_string(),
            },
            calculation,
            validation_errors: Vec::new(),
        };

        let stats = NutritionStats::from(&details);
        assert_eq!(stats.macro_grams, "176P / 247C / 63F");
        assert_eq!(stats.daily_calories, "2259 cal");
        assert_eq!(stats.macro_split, "31/44/25");
        assert!(!stats.has_warnings);
    }

    #[test]
    fn test_plan_with_calculation_flattens_plan_fields() {
        let details = NutritionPlanWithCalculation {
            plan: NutritionPlan {
                id: "plan_1".to_string(),
                user_id: "u1".to_string(),
                daily_calories: 2000,
                protein_grams: 150,
                carbs_grams: 200,
                fats_grams: 67,
                custom_ratios: None,
                start_date: day(2026, 1, 1),
                is_active: true,
                created_at: "2026-01-01T00:00:00.000Z".to_string(),
            },
            calculation: NutritionCalculationResult {
                bmr: 1780.0,
                tdee: 2500,
                adjusted_calories: 2000,
                protein_grams: 150,
                carbs_grams: 200,
                fats_grams: 67,
                protein_calories: 600,
                carbs_calories: 800,
                fats_calories: 603,
                protein_percentage: 29.96,
                carbs_percentage: 39.94,
                fats_percentage: 30.1,
            },
            validation_errors: Vec::new(),
        };

        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["id"], "plan_1");
        assert_eq!(json["daily_calories"], 2000);
        assert_eq!(json["start_date"], "2026-01-01");
        assert_eq!(json["calculation"]["tdee"], 2500);
        assert!(json["validation_errors"].as_array().unwrap().is_empty());
    }
}
