//! Classifier artifact provisioning and inference.
//!
//! The artifact is an ONNX model fetched from a model registry on first run,
//! cached on local disk, and loaded exactly once at startup. Any failure in
//! this module during startup is fatal: the service must not accept traffic
//! without a loaded classifier.

pub mod classifier;
pub mod provider;

pub use classifier::{Classifier, ClassifierError, MoodClassifier};
pub use provider::ensure_artifact;

use thiserror::Error;

/// Startup-fatal artifact failures.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Network-level fetch failure
    #[error("artifact fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// Registry answered with a non-success status
    #[error("artifact fetch returned HTTP {status}")]
    FetchStatus { status: u16 },

    /// Local cache IO failure
    #[error("artifact cache IO failed: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact bytes could not be loaded as a model
    #[error("failed to load classifier artifact: {0}")]
    Load(String),

    /// Artifact carries no usable label vocabulary
    #[error("artifact label vocabulary invalid: {0}")]
    Vocabulary(String),
}
