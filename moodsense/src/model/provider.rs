//! Artifact provisioning: local cache check, registry fetch, atomic persist.
//!
//! A cache hit performs zero network calls. A miss performs exactly one GET
//! against the registry URL; anything but HTTP 200 is fatal to startup.

use std::path::PathBuf;

use tracing::info;

use super::ArtifactError;
use crate::config::ModelConfig;

/// Local path the artifact is cached at.
pub fn artifact_path(config: &ModelConfig) -> PathBuf {
    config.cache_dir.join(&config.filename)
}

/// Ensure the classifier artifact exists locally, fetching it on first run.
///
/// Returns the path to the cached artifact. Presence of the cache file is
/// sufficient to skip the fetch; no checksum is verified.
pub async fn ensure_artifact(config: &ModelConfig) -> Result<PathBuf, ArtifactError> {
    let path = artifact_path(config);

    if path.exists() {
        info!(path = %path.display(), "Classifier artifact found in local cache");
        return Ok(path);
    }

    tokio::fs::create_dir_all(&config.cache_dir).await?;

    let url = config.artifact_url();
    info!(%url, "Downloading classifier artifact");

    let response = reqwest::get(&url).await?;
    if !response.status().is_success() {
        return Err(ArtifactError::FetchStatus {
            status: response.status().as_u16(),
        });
    }

    let bytes = response.bytes().await?;

    // Write to a temp file and rename so a crash never leaves a partial
    // artifact at the load path
    let temp_path = path.with_extension("tmp");
    tokio::fs::write(&temp_path, &bytes).await?;
    tokio::fs::rename(&temp_path, &path).await?;

    info!(
        bytes = bytes.len(),
        path = %path.display(),
        "Classifier artifact downloaded"
    );

    Ok(path)
}
