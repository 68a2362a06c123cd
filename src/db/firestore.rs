// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Profiles (one document per user)
//! - Nutrition plans (stored as [`PlanRecord`])
//! - Meal logs

use super::records::PlanRecord;
use super::{collections, newest_plan_first, NutritionStore};
use crate::error::AppError;
use crate::models::{MealLog, NutritionPlan, PlanUpdate, UserProfile};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

/// User ids become document ids, which must not contain `/`.
fn profile_doc_id(user_id: &str) -> String {
    urlencoding::encode(user_id).into_owned()
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    async fn get_plan_record(&self, plan_id: &str) -> Result<Option<PlanRecord>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::NUTRITION_PLANS)
            .obj()
            .one(plan_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn put_plan_record(&self, record: &PlanRecord) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::NUTRITION_PLANS)
            .document_id(&record.id)
            .object(record)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn active_plan_records(&self, user_id: &str) -> Result<Vec<PlanRecord>, AppError> {
        self.client
            .fluent()
            .select()
            .from(collections::NUTRITION_PLANS)
            .filter(|q| {
                q.for_all([
                    q.field("userId").eq(user_id),
                    q.field("isActive").eq(true),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl NutritionStore for FirestoreDb {
    // ─── Profile Operations ──────────────────────────────────────

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::PROFILES)
            .obj()
            .one(&profile_doc_id(user_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::PROFILES)
            .document_id(profile_doc_id(&profile.id))
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Plan Operations ─────────────────────────────────────────

    async fn create_plan(&self, plan: &NutritionPlan) -> Result<(), AppError> {
        self.put_plan_record(&PlanRecord::from(plan)).await
    }

    async fn update_plan(&self, plan_id: &str, update: &PlanUpdate) -> Result<(), AppError> {
        let record = self
            .get_plan_record(plan_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("plan {}", plan_id)))?;

        let mut plan = NutritionPlan::try_from(record)?;
        update.apply_to(&mut plan);
        self.put_plan_record(&PlanRecord::from(&plan)).await
    }

    async fn get_active_plan(&self, user_id: &str) -> Result<Option<NutritionPlan>, AppError> {
        let mut records = self.active_plan_records(user_id).await?;
        if records.len() > 1 {
            tracing::warn!(
                user_id,
                count = records.len(),
                "Multiple active plans found, using the newest"
            );
        }
        records.sort_by(|a, b| {
            b.start_date
                .cmp(&a.start_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        records
            .into_iter()
            .next()
            .map(NutritionPlan::try_from)
            .transpose()
    }

    async fn get_all_plans(&self, user_id: &str) -> Result<Vec<NutritionPlan>, AppError> {
        let records: Vec<PlanRecord> = self
            .client
            .fluent()
            .select()
            .from(collections::NUTRITION_PLANS)
            .filter(|q| q.for_all([q.field("userId").eq(user_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut plans = records
            .into_iter()
            .map(NutritionPlan::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        plans.sort_by(newest_plan_first);
        Ok(plans)
    }

    async fn deactivate_all_plans(&self, user_id: &str) -> Result<(), AppError> {
        for mut record in self.active_plan_records(user_id).await? {
            record.is_active = false;
            self.put_plan_record(&record).await?;
        }
        Ok(())
    }

    /// Deactivate existing plans and write the new one in one transaction.
    async fn activate_plan(&self, plan: &NutritionPlan) -> Result<(), AppError> {
        let active = self.active_plan_records(&plan.user_id).await?;
        let new_record = PlanRecord::from(plan);

        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        for mut record in active {
            record.is_active = false;
            self.client
                .fluent()
                .update()
                .in_col(collections::NUTRITION_PLANS)
                .document_id(&record.id)
                .object(&record)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!(
                        "Failed to add plan deactivation to transaction: {}",
                        e
                    ))
                })?;
        }

        self.client
            .fluent()
            .update()
            .in_col(collections::NUTRITION_PLANS)
            .document_id(&new_record.id)
            .object(&new_record)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add plan to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::debug!(
            user_id = %plan.user_id,
            plan_id = %plan.id,
            "Plan activated atomically"
        );

        Ok(())
    }

    // ─── Meal Log Operations ─────────────────────────────────────

    async fn create_meal_log(&self, log: &MealLog) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::MEAL_LOGS)
            .document_id(&log.id)
            .object(log)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get_meal_logs(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<MealLog>, AppError> {
        let date = date.format("%Y-%m-%d").to_string();
        let mut logs: Vec<MealLog> = self
            .client
            .fluent()
            .select()
            .from(collections::MEAL_LOGS)
            .filter(|q| {
                q.for_all([
                    q.field("user_id").eq(user_id),
                    q.field("date").eq(date.as_str()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Sorted here rather than in the query to avoid a composite index.
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(logs)
    }

    async fn delete_meal_log(&self, user_id: &str, meal_id: &str) -> Result<bool, AppError> {
        let existing: Option<MealLog> = self
            .client
            .fluent()
            .select()
            .by_id_in(collections::MEAL_LOGS)
            .obj()
            .one(meal_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match existing {
            Some(log) if log.user_id == user_id => {
                self.client
                    .fluent()
                    .delete()
                    .from(collections::MEAL_LOGS)
                    .document_id(meal_id)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
