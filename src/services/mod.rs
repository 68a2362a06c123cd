// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod calculator;
pub mod food_analysis;
pub mod meals;
pub mod plans;
pub mod validator;

pub use food_analysis::{FoodAnalysis, FoodAnalyzer};
pub use meals::{DailyProgress, MealService};
pub use plans::{CreatePlanOptions, NutritionPlanWithCalculation, NutritionStats, PlanService};
