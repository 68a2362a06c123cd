// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meal logging and daily progress against the active plan.

use crate::db::Store;
use crate::error::AppError;
use crate::models::{Macros, MealLog, NewMealLog, NutritionPlan};
use crate::time_utils::{now_rfc3339, today_utc};
use chrono::NaiveDate;
use serde::Serialize;
use validator::Validate;

#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Calories and macros, either consumed or targeted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub struct NutrientTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl NutrientTotals {
    fn from_plan(plan: &NutritionPlan) -> Self {
        Self {
            calories: plan.daily_calories as f64,
            protein: plan.protein_grams as f64,
            carbs: plan.carbs_grams as f64,
            fats: plan.fats_grams as f64,
        }
    }

    fn add(&mut self, calories: f64, macros: Macros) {
        self.calories += calories;
        self.protein += macros.protein;
        self.carbs += macros.carbs;
        self.fats += macros.fats;
    }
}

/// Intake for one day compared with the active plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub struct DailyProgress {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date: NaiveDate,
    pub meal_count: usize,
    pub consumed: NutrientTotals,
    /// Absent when the user has no active plan
    pub targets: Option<NutrientTotals>,
    pub remaining_calories: Option<f64>,
    /// Percent of each target reached
    pub progress: Option<NutrientTotals>,
}

/// Percent of `target` reached; zero when there is no positive target.
fn progress_percentage(consumed: f64, target: f64) -> f64 {
    if target > 0.0 {
        consumed / target * 100.0
    } else {
        0.0
    }
}

/// Summarize a day's logs against an optional plan.
pub fn summarize_day(date: NaiveDate, logs: &[MealLog], plan: Option<&NutritionPlan>) -> DailyProgress {
    let mut consumed = NutrientTotals::default();
    for log in logs {
        let (calories, macros) = log.totals();
        consumed.add(calories, macros);
    }

    let targets = plan.map(NutrientTotals::from_plan);
    let remaining_calories = targets.map(|t| (t.calories - consumed.calories).max(0.0));
    let progress = targets.map(|t| NutrientTotals {
        calories: progress_percentage(consumed.calories, t.calories),
        protein: progress_percentage(consumed.protein, t.protein),
        carbs: progress_percentage(consumed.carbs, t.carbs),
        fats: progress_percentage(consumed.fats, t.fats),
    });

    DailyProgress {
        date,
        meal_count: logs.len(),
        consumed,
        targets,
        remaining_calories,
        progress,
    }
}

/// Meal log service.
pub struct MealService {
    store: Store,
}

impl MealService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Validate and store a meal.
    pub async fn log_meal(&self, user_id: &str, input: NewMealLog) -> Result<MealLog, AppError> {
        input.validate()?;
        if input.items.iter().any(|item| item.name.trim().is_empty()) {
            return Err(AppError::BadRequest("Meal item names must not be blank".to_string()));
        }

        let log = MealLog {
            id: format!("meal_{}", uuid::Uuid::new_v4().simple()),
            user_id: user_id.to_string(),
            date: input.date.unwrap_or_else(today_utc),
            meal_type: input.meal_type,
            items: input.items,
            notes: input.notes.filter(|n| !n.trim().is_empty()),
            created_at: now_rfc3339(),
        };
        self.store.create_meal_log(&log).await?;

        tracing::debug!(
            user_id,
            meal_id = %log.id,
            items = log.items.len(),
            "Logged meal"
        );

        Ok(log)
    }

    /// Meals logged on `date`, newest first.
    pub async fn meals_for_day(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<MealLog>, AppError> {
        self.store.get_meal_logs(user_id, date).await
    }

    pub async fn delete_meal(&self, user_id: &str, meal_id: &str) -> Result<(), AppError> {
        if !self.store.delete_meal_log(user_id, meal_id).await? {
            return Err(AppError::NotFound(format!("meal {}", meal_id)));
        }
        tracing::debug!(user_id, meal_id, "Deleted meal");
        Ok(())
    }

    /// Consumption on `date` against the user's active plan, if any.
    pub async fn daily_progress(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<DailyProgress, AppError> {
        let logs = self.store.get_meal_logs(user_id, date).await?;
        let plan = self.store.get_active_plan(user_id).await?;
        Ok(summarize_day(date, &logs, plan.as_ref()))
    }
}
