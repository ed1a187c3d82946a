//! Configuration resolution for moodsense.
//!
//! Priority: environment variables > TOML file > built-in defaults. The TOML
//! path comes from `MOODSENSE_CONFIG` (default `moodsense.toml` in the
//! working directory); every resolution step is logged at startup.

use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;
use tracing::{info, warn};

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 8000;

/// Service configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listen port
    pub port: u16,
    /// Classifier artifact source and cache
    pub model: ModelConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            model: ModelConfig::default(),
        }
    }
}

/// Where the classifier artifact lives, remotely and locally.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Local cache directory for the downloaded artifact
    pub cache_dir: PathBuf,
    /// Registry base URL (scheme + host)
    pub endpoint: String,
    /// Registry namespace (user or organization)
    pub namespace: String,
    /// Repository under the namespace
    pub repository: String,
    /// Artifact filename inside the repository
    pub filename: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./models"),
            endpoint: "https://huggingface.co".to_string(),
            namespace: "moodsense".to_string(),
            repository: "mood-classifier".to_string(),
            filename: "mood-classifier-1.onnx".to_string(),
        }
    }
}

impl ModelConfig {
    /// Fetch URL: `<endpoint>/<namespace>/<repository>/resolve/main/<filename>`
    pub fn artifact_url(&self) -> String {
        format!(
            "{}/{}/{}/resolve/main/{}",
            self.endpoint.trim_end_matches('/'),
            self.namespace,
            self.repository,
            self.filename
        )
    }
}

impl Config {
    /// Resolve configuration from ENV, TOML, and defaults.
    pub fn load() -> anyhow::Result<Config> {
        let toml_path = std::env::var("MOODSENSE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("moodsense.toml"));

        let mut config = if toml_path.exists() {
            let content = std::fs::read_to_string(&toml_path)
                .with_context(|| format!("failed to read config: {}", toml_path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("failed to parse config: {}", toml_path.display()))?;
            info!(path = %toml_path.display(), "Configuration loaded from TOML");
            config
        } else {
            info!("No TOML configuration found, using defaults");
            Config::default()
        };

        if let Ok(value) = std::env::var("MOODSENSE_PORT") {
            match value.parse::<u16>() {
                Ok(port) => {
                    config.port = port;
                    info!(port, "Listen port overridden from environment");
                }
                Err(_) => warn!(value = %value, "Ignoring invalid MOODSENSE_PORT"),
            }
        }

        if let Ok(dir) = std::env::var("MOODSENSE_MODEL_DIR") {
            config.model.cache_dir = PathBuf::from(&dir);
            info!(dir = %dir, "Model cache directory overridden from environment");
        }

        Ok(config)
    }
}
