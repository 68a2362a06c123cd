// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store used for local development and tests.

use super::{newest_plan_first, NutritionStore};
use crate::error::AppError;
use crate::models::{MealLog, NutritionPlan, PlanUpdate, UserProfile};
use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;

/// Store backed by concurrent hash maps.
///
/// Plans and meal logs are sharded by user id, so holding one user's entry
/// makes a multi-row change for that user atomic.
#[derive(Default)]
pub struct MemoryDb {
    profiles: DashMap<String, UserProfile>,
    plans: DashMap<String, Vec<NutritionPlan>>,
    meal_logs: DashMap<String, Vec<MealLog>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NutritionStore for MemoryDb {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        Ok(self.profiles.get(user_id).map(|p| p.clone()))
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), AppError> {
        self.profiles.insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    async fn create_plan(&self, plan: &NutritionPlan) -> Result<(), AppError> {
        self.plans
            .entry(plan.user_id.clone())
            .or_default()
            .push(plan.clone());
        Ok(())
    }

    async fn update_plan(&self, plan_id: &str, update: &PlanUpdate) -> Result<(), AppError> {
        for mut user_plans in self.plans.iter_mut() {
            if let Some(plan) = user_plans.iter_mut().find(|p| p.id == plan_id) {
                update.apply_to(plan);
                return Ok(());
            }
        }
        Err(AppError::NotFound(format!("plan {}", plan_id)))
    }

    async fn get_active_plan(&self, user_id: &str) -> Result<Option<NutritionPlan>, AppError> {
        Ok(self
            .plans
            .get(user_id)
            .and_then(|plans| plans.iter().find(|p| p.is_active).cloned()))
    }

    async fn get_all_plans(&self, user_id: &str) -> Result<Vec<NutritionPlan>, AppError> {
        let mut plans = self
            .plans
            .get(user_id)
            .map(|p| p.clone())
            .unwrap_or_default();
        plans.sort_by(newest_plan_first);
        Ok(plans)
    }

    async fn deactivate_all_plans(&self, user_id: &str) -> Result<(), AppError> {
        if let Some(mut plans) = self.plans.get_mut(user_id) {
            for plan in plans.iter_mut() {
                plan.is_active = false;
            }
        }
        Ok(())
    }

    async fn activate_plan(&self, plan: &NutritionPlan) -> Result<(), AppError> {
        let mut plans = self.plans.entry(plan.user_id.clone()).or_default();
        for existing in plans.iter_mut() {
            existing.is_active = false;
        }
        plans.push(plan.clone());
        Ok(())
    }

    async fn create_meal_log(&self, log: &MealLog) -> Result<(), AppError> {
        self.meal_logs
            .entry(log.user_id.clone())
            .or_default()
            .push(log.clone());
        Ok(())
    }

    async fn get_meal_logs(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<MealLog>, AppError> {
        let mut logs: Vec<MealLog> = self
            .meal_logs
            .get(user_id)
            .map(|logs| logs.iter().filter(|l| l.date == date).cloned().collect())
            .unwrap_or_default();
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(logs)
    }

    async fn delete_meal_log(&self, user_id: &str, meal_id: &str) -> Result<bool, AppError> {
        let Some(mut logs) = self.meal_logs.get_mut(user_id) else {
            return Ok(false);
        };
        let before = logs.len();
        logs.retain(|l| l.id != meal_id);
        Ok(logs.len() != before)
    }
}
