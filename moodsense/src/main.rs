//! moodsense - Voice Mood Inference Microservice
//!
//! Accepts an uploaded audio clip over HTTP, extracts a 23-dimensional
//! prosodic/spectral feature vector, and classifies it into a mood label
//! with a pretrained model fetched from a model registry on first run.
//!
//! Startup is strictly ordered: the classifier artifact must be provisioned
//! and loaded before the listener binds, so no request can ever observe a
//! missing model.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use moodsense::config::Config;
use moodsense::model::{self, Classifier, MoodClassifier};
use moodsense::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting moodsense (Voice Mood Inference) microservice");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Step 1: Resolve configuration (ENV > TOML > defaults)
    let config = Config::load()?;

    // Step 2: Provision the classifier artifact (cache hit or single fetch)
    let artifact = model::ensure_artifact(&config.model).await?;

    // Step 3: Load the artifact into process-wide immutable state
    let classifier =
        tokio::task::spawn_blocking(move || MoodClassifier::load(&artifact)).await??;
    info!(
        labels = classifier.labels().len(),
        "Mood vocabulary discovered from artifact"
    );

    // Step 4: Build application state and router
    let state = AppState::new(Arc::new(classifier));
    let app = build_router(state);

    // Step 5: Bind and serve
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
