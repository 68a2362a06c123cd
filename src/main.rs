// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Diet planner API server
//!
//! Serves nutrition plans, meal logs and food photo analysis to the
//! mobile app.

use diet_planner::{
    config::{Config, StoreBackend},
    db::{FirestoreDb, MemoryDb, Store},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting diet planner API");

    let store: Store = match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, data is lost on restart");
            Arc::new(MemoryDb::new())
        }
        StoreBackend::Firestore => {
            let project_id = config
                .gcp_project_id
                .as_deref()
                .expect("GCP_PROJECT_ID is checked by Config::from_env");
            Arc::new(
                FirestoreDb::new(project_id)
                    .await
                    .expect("Failed to connect to Firestore"),
            )
        }
    };

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), store));
    if state.food_analyzer.is_mock() {
        tracing::info!("Food analysis is mocked");
    }

    // Build router
    let app = diet_planner::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("diet_planner=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
