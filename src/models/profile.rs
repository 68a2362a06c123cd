// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! User profile model: the biometric snapshot the planning engine reads.

use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Biological sex category. Drives the BMR formula branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    Other,
}

/// Weight goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Lose,
    Maintain,
    Gain,
}

/// Activity level for TDEE calculation.
///
/// Stored and transmitted as its multiplier (`1.2`, `1.375`, ...) so records
/// written by the mobile client stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Light exercise 1-3 days/week
    LightlyActive,
    /// Moderate exercise 3-5 days/week
    ModeratelyActive,
    /// Hard exercise 6-7 days/week
    VeryActive,
    /// Physical job or training twice a day
    ExtraActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtraActive,
    ];

    /// TDEE multiplier for this level.
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }

    /// Map a stored multiplier back onto its level.
    pub fn from_multiplier(value: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| (level.multiplier() - value).abs() < 1e-6)
    }
}

impl TryFrom<f64> for ActivityLevel {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_multiplier(value).ok_or_else(|| {
            format!(
                "invalid activity level multiplier {} (expected one of 1.2, 1.375, 1.55, 1.725, 1.9)",
                value
            )
        })
    }
}

impl From<ActivityLevel> for f64 {
    fn from(level: ActivityLevel) -> f64 {
        level.multiplier()
    }
}

/// User profile stored per device user.
///
/// Biometric fields are optional because onboarding fills them in
/// incrementally; calculation requires all of them (see [`UserProfile::complete`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Opaque identifier, stable per device/user (also used as document ID)
    pub id: String,
    /// Age in years
    pub age: Option<f64>,
    pub sex: Option<Sex>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub goal: Option<Goal>,
    #[serde(default)]
    pub target_weight_kg: Option<f64>,
    /// Free-form dietary restriction tags (e.g. "vegetarian")
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    /// When the profile was created (ISO 8601)
    pub created_at: String,
    /// Last profile update (ISO 8601)
    pub updated_at: String,
}

/// The biometric fields of a profile that passed the completeness check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompleteProfile {
    pub age: f64,
    pub sex: Sex,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
}

impl UserProfile {
    /// Create an empty profile for a user who has not onboarded yet.
    pub fn new(id: impl Into<String>, now: &str) -> Self {
        Self {
            id: id.into(),
            age: None,
            sex: None,
            height_cm: None,
            weight_kg: None,
            activity_level: None,
            goal: None,
            target_weight_kg: None,
            dietary_restrictions: Vec::new(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    /// Check that every field the calculator needs is present.
    ///
    /// Zero, negative or implausibly large measurements count as missing.
    pub fn complete(&self) -> Result<CompleteProfile, AppError> {
        let mut missing = Vec::new();

        let age = within(self.age, MAX_AGE);
        let height_cm = within(self.height_cm, MAX_HEIGHT_CM);
        let weight_kg = within(self.weight_kg, MAX_WEIGHT_KG);

        if age.is_none() {
            missing.push("age");
        }
        if self.sex.is_none() {
            missing.push("sex");
        }
        if height_cm.is_none() {
            missing.push("height_cm");
        }
        if weight_kg.is_none() {
            missing.push("weight_kg");
        }
        if self.activity_level.is_none() {
            missing.push("activity_level");
        }
        if self.goal.is_none() {
            missing.push("goal");
        }

        match (
            age,
            self.sex,
            height_cm,
            weight_kg,
            self.activity_level,
            self.goal,
        ) {
            (
                Some(age),
                Some(sex),
                Some(height_cm),
                Some(weight_kg),
                Some(activity_level),
                Some(goal),
            ) => Ok(CompleteProfile {
                age,
                sex,
                height_cm,
                weight_kg,
                activity_level,
                goal,
            }),
            _ => Err(AppError::IncompleteProfile { missing }),
        }
    }
}

/// Upper limits for stored measurements. Kept in step with `ProfileInput`.
pub const MAX_AGE: f64 = 130.0;
pub const MAX_HEIGHT_CM: f64 = 300.0;
pub const MAX_WEIGHT_KG: f64 = 700.0;

fn within(value: Option<f64>, max: f64) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0 && *v <= max)
}
