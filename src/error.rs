// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::services::validator::ValidationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("User profile is incomplete. Missing required fields for nutrition calculation: {}", .missing.join(", "))]
    IncompleteProfile { missing: Vec<&'static str> },

    #[error("User with ID {0} not found")]
    ProfileNotFound(String),

    #[error("Nutrition plan validation failed:\n{}", format_violations(.0))]
    ValidationFailed(Vec<ValidationError>),

    #[error("Nutrition plan recalculation validation failed:\n{}", format_violations(.0))]
    RecalculationFailed(Vec<ValidationError>),

    #[error("Custom macro ratios must sum to 100%. Current sum: {sum:.1}%")]
    RatioSumInvalid { sum: f64 },

    #[error("No active nutrition plan found for user {0}")]
    PlanNotFound(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Food analysis error: {0}")]
    FoodAnalysis(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

fn format_violations(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::BadRequest(errors.to_string())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    violations: Option<Vec<ValidationError>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let details = Some(self.to_string());
        let (status, error, details, violations) = match self {
            AppError::IncompleteProfile { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "incomplete_profile",
                details,
                None,
            ),
            AppError::ProfileNotFound(_) => {
                (StatusCode::NOT_FOUND, "profile_not_found", details, None)
            }
            AppError::ValidationFailed(errors) | AppError::RecalculationFailed(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_failed",
                details,
                Some(errors),
            ),
            AppError::RatioSumInvalid { .. } => {
                (StatusCode::BAD_REQUEST, "ratio_sum_invalid", details, None)
            }
            AppError::PlanNotFound(_) => (StatusCode::NOT_FOUND, "plan_not_found", details, None),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", details, None),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", details, None),
            AppError::FoodAnalysis(_) => (StatusCode::BAD_GATEWAY, "analysis_error", details, None),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    None,
                    None,
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    None,
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
            violations,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers and services
pub type Result<T> = std::result::Result<T, AppError>;
