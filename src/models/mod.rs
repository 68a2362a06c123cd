// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod meal;
pub mod plan;
pub mod profile;

pub use meal::{Macros, MealItem, MealLog, MealType, NewMealLog};
pub use plan::{CustomMacroRatios, NutritionPlan, PlanUpdate};
pub use profile::{ActivityLevel, CompleteProfile, Goal, Sex, UserProfile};
