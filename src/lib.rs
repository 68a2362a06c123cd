// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Diet planner: daily calorie and macro targets from a user's body metrics.
//!
//! This crate provides the nutrition engine (calculator, safety validator,
//! plan lifecycle), meal tracking, and the JSON API used by the mobile app.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Store;
use services::{FoodAnalyzer, MealService, PlanService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub plan_service: PlanService,
    pub meal_service: MealService,
    pub food_analyzer: FoodAnalyzer,
}

impl AppState {
    /// Wire the services around a store.
    pub fn new(config: Config, store: Store) -> Self {
        let plan_service = PlanService::new(store.clone(), config.stale_plan_days);
        let meal_service = MealService::new(store.clone());
        let food_analyzer = FoodAnalyzer::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            config.mock_food_analysis,
        );

        Self {
            config,
            store,
            plan_service,
            meal_service,
            food_analyzer,
        }
    }
}
