// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persisted record shapes.
//!
//! Plan rows keep the layout the mobile client already writes: camelCase
//! fields, `startDate` as `YYYY-MM-DD`, and the ratio override as an opaque
//! JSON string. Conversion to and from [`NutritionPlan`] happens only here.

use crate::error::AppError;
use crate::models::{CustomMacroRatios, NutritionPlan};
use crate::time_utils::parse_date;
use serde::{Deserialize, Serialize};

/// Stored nutrition plan document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRecord {
    pub id: String,
    pub user_id: String,
    pub daily_calories: i64,
    pub protein_grams: i64,
    pub carbs_grams: i64,
    pub fats_grams: i64,
    /// Serialized [`StoredRatios`], or null
    pub custom_ratios: Option<String>,
    /// YYYY-MM-DD
    pub start_date: String,
    pub is_active: bool,
    pub created_at: String,
}

/// Ratio override as it appears inside `customRatios`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRatios {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    protein_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    carbs_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fats_percentage: Option<f64>,
}

impl From<CustomMacroRatios> for StoredRatios {
    fn from(r: CustomMacroRatios) -> Self {
        Self {
            protein_percentage: r.protein_percentage,
            carbs_percentage: r.carbs_percentage,
            fats_percentage: r.fats_percentage,
        }
    }
}

impl From<StoredRatios> for CustomMacroRatios {
    fn from(r: StoredRatios) -> Self {
        Self {
            protein_percentage: r.protein_percentage,
            carbs_percentage: r.carbs_percentage,
            fats_percentage: r.fats_percentage,
        }
    }
}

/// Serialize a ratio override for the `customRatios` column.
pub fn encode_ratios(ratios: &CustomMacroRatios) -> String {
    // A struct of three optional floats always serializes.
    serde_json::to_string(&StoredRatios::from(*ratios)).unwrap_or_else(|_| "{}".to_string())
}

/// Parse the `customRatios` column.
///
/// An unreadable value is treated as "no override".
pub fn decode_ratios(raw: &str, plan_id: &str) -> Option<CustomMacroRatios> {
    match serde_json::from_str::<StoredRatios>(raw) {
        Ok(stored) => Some(stored.into()),
        Err(e) => {
            tracing::warn!(plan_id, error = %e, "Ignoring unreadable custom ratios");
            None
        }
    }
}

impl From<&NutritionPlan> for PlanRecord {
    fn from(plan: &NutritionPlan) -> Self {
        Self {
            id: plan.id.clone(),
            user_id: plan.user_id.clone(),
            daily_calories: plan.daily_calories,
            protein_grams: plan.protein_grams,
            carbs_grams: plan.carbs_grams,
            fats_grams: plan.fats_grams,
            custom_ratios: plan.custom_ratios.as_ref().map(encode_ratios),
            start_date: plan.start_date.format("%Y-%m-%d").to_string(),
            is_active: plan.is_active,
            created_at: plan.created_at.clone(),
        }
    }
}

impl TryFrom<PlanRecord> for NutritionPlan {
    type Error = AppError;

    fn try_from(record: PlanRecord) -> Result<Self, Self::Error> {
        let start_date = parse_date(&record.start_date).ok_or_else(|| {
            AppError::Database(format!(
                "Plan {} has invalid start date {:?}",
                record.id, record.start_date
            ))
        })?;
        let custom_ratios = record
            .custom_ratios
            .as_deref()
            .and_then(|raw| decode_ratios(raw, &record.id));

        Ok(Self {
            id: record.id,
            user_id: record.user_id,
            daily_calories: record.daily_calories,
            protein_grams: record.protein_grams,
            carbs_grams: record.carbs_grams,
            fats_grams: record.fats_grams,
            custom_ratios,
            start_date,
            is_active: record.is_active,
            created_at: record.created_at,
        })
    }
}
