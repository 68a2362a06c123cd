// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Meal log model for daily intake tracking.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

/// Macro amounts in grams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Macros {
    #[validate(range(min = 0.0, max = 2000.0))]
    pub protein: f64,
    #[validate(range(min = 0.0, max = 2000.0))]
    pub carbs: f64,
    #[validate(range(min = 0.0, max = 2000.0))]
    pub fats: f64,
}

/// One food item within a logged meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct MealItem {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Energy in kcal
    #[validate(range(min = 0.0, max = 20000.0))]
    pub calories: f64,
    #[validate(nested)]
    pub macros: Macros,
}

/// Stored meal log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealLog {
    pub id: String,
    pub user_id: String,
    /// Day the meal counts towards
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub items: Vec<MealItem>,
    pub notes: Option<String>,
    /// When the entry was written (ISO 8601)
    pub created_at: String,
}

impl MealLog {
    /// Sum of calories and macros across all items.
    pub fn totals(&self) -> (f64, Macros) {
        self.items
            .iter()
            .fold((0.0, Macros::default()), |(calories, macros), item| {
                (
                    calories + item.calories,
                    Macros {
                        protein: macros.protein + item.macros.protein,
                        carbs: macros.carbs + item.macros.carbs,
                        fats: macros.fats + item.macros.fats,
                    },
                )
            })
    }
}

/// Request body for logging a meal.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewMealLog {
    /// Defaults to today
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub meal_type: MealType,
    #[validate(length(min = 1, max = 50), nested)]
    pub items: Vec<MealItem>,
    #[validate(length(max = 500))]
    #[serde(default)]
    pub notes: Option<String>,
}
