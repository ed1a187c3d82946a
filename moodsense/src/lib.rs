//! moodsense library interface
//!
//! Exposes the pipeline components and router for integration testing.

pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod features;
pub mod model;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::model::Classifier;

/// Application state shared across handlers.
///
/// Constructed exactly once in `main` after the artifact loads and injected
/// into every handler; the classifier is never mutated or reloaded.
#[derive(Clone)]
pub struct AppState {
    /// Loaded classifier, read-only for the process lifetime
    pub classifier: Arc<dyn Classifier>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last server-side prediction error, for diagnostics
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use tower_http::{cors::CorsLayer, trace::TraceLayer};

    Router::new()
        .merge(api::predict_routes())
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
