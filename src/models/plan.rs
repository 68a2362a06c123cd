// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Nutrition plan model and custom macro ratio overrides.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default split used when a ratio override leaves a macro unspecified.
pub const DEFAULT_PROTEIN_PERCENTAGE: f64 = 30.0;
pub const DEFAULT_CARBS_PERCENTAGE: f64 = 40.0;
pub const DEFAULT_FATS_PERCENTAGE: f64 = 30.0;

/// User-chosen macro split, in percent of total calories (0-100 each).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomMacroRatios {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fats_percentage: Option<f64>,
}

impl CustomMacroRatios {
    pub fn new(protein: f64, carbs: f64, fats: f64) -> Self {
        Self {
            protein_percentage: Some(protein),
            carbs_percentage: Some(carbs),
            fats_percentage: Some(fats),
        }
    }

    /// All three percentages, only when every one of them is present.
    pub fn fully_specified(&self) -> Option<(f64, f64, f64)> {
        match (
            self.protein_percentage,
            self.carbs_percentage,
            self.fats_percentage,
        ) {
            (Some(p), Some(c), Some(f)) => Some((p, c, f)),
            _ => None,
        }
    }

    /// Percentages with unspecified macros filled from the 30/40/30 default.
    pub fn with_defaults(&self) -> (f64, f64, f64) {
        (
            self.protein_percentage
                .unwrap_or(DEFAULT_PROTEIN_PERCENTAGE),
            self.carbs_percentage.unwrap_or(DEFAULT_CARBS_PERCENTAGE),
            self.fats_percentage.unwrap_or(DEFAULT_FATS_PERCENTAGE),
        )
    }

    /// Sum of the given percentages; missing ones count as zero.
    pub fn sum(&self) -> f64 {
        self.protein_percentage.unwrap_or(0.0)
            + self.carbs_percentage.unwrap_or(0.0)
            + self.fats_percentage.unwrap_or(0.0)
    }
}

/// A committed daily nutrition target for one user.
///
/// Plans are never deleted: superseded plans are deactivated and kept as
/// history. At most one plan per user is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionPlan {
    pub id: String,
    pub user_id: String,
    pub daily_calories: i64,
    pub protein_grams: i64,
    pub carbs_grams: i64,
    pub fats_grams: i64,
    /// Ratio override the plan was computed with, if any
    pub custom_ratios: Option<CustomMacroRatios>,
    /// First day the plan applies to
    pub start_date: NaiveDate,
    pub is_active: bool,
    /// When the plan row was written (ISO 8601)
    pub created_at: String,
}

/// Partial update applied to a stored plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanUpdate {
    pub daily_calories: Option<i64>,
    pub protein_grams: Option<i64>,
    pub carbs_grams: Option<i64>,
    pub fats_grams: Option<i64>,
    /// `Some(None)` clears the override
    pub custom_ratios: Option<Option<CustomMacroRatios>>,
    pub is_active: Option<bool>,
}

impl PlanUpdate {
    /// Apply the fields that are set, leaving the rest untouched.
    pub fn apply_to(&self, plan: &mut NutritionPlan) {
        if let Some(v) = self.daily_calories {
            plan.daily_calories = v;
        }
        if let Some(v) = self.protein_grams {
            plan.protein_grams = v;
        }
        if let Some(v) = self.carbs_grams {
            plan.carbs_grams = v;
        }
        if let Some(v) = self.fats_grams {
            plan.fats_grams = v;
        }
        if let Some(v) = self.custom_ratios {
            plan.custom_ratios = v;
        }
        if let Some(v) = self.is_active {
            plan.is_active = v;
        }
    }
}
