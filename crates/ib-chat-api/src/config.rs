//! Chat server configuration, loadable from TOML or environment.

use std::path::PathBuf;

use serde::Deserialize;

use ib_classifier::TrainingConfig;

use crate::engine::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::session::DEFAULT_IDLE_TTL;

/// Top-level chat server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Listen address (e.g., "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Intent catalog searched before the default locations.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    /// Directory for cached trained artifacts.
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
    /// CSV transcript file.
    #[serde(default = "default_transcript_path")]
    pub transcript_path: PathBuf,
    /// Classifier probability that must be exceeded to trust a tag.
    #[serde(default = "default_threshold")]
    pub confidence_threshold: f64,
    /// Seconds a conversation may stay idle before it is forgotten.
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
    /// Ignore cached artifacts and retrain at startup.
    #[serde(default)]
    pub retrain: bool,
    /// Classifier training settings.
    #[serde(default)]
    pub training: TrainingConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_transcript_path() -> PathBuf {
    PathBuf::from("chat_log.csv")
}

fn default_threshold() -> f64 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_session_idle_secs() -> u64 {
    DEFAULT_IDLE_TTL.as_secs()
}

impl ChatConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config from `INTENTBOT_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup (unset or unparseable → default).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("INTENTBOT_HOST").unwrap_or(defaults.host),
            port: lookup("INTENTBOT_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            catalog_path: lookup("INTENTBOT_CATALOG").map(PathBuf::from),
            model_dir: lookup("INTENTBOT_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),
            transcript_path: lookup("INTENTBOT_TRANSCRIPT")
                .map(PathBuf::from)
                .unwrap_or(defaults.transcript_path),
            confidence_threshold: lookup("INTENTBOT_THRESHOLD")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.confidence_threshold),
            session_idle_secs: lookup("INTENTBOT_SESSION_IDLE_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.session_idle_secs),
            retrain: lookup("INTENTBOT_RETRAIN")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
            training: defaults.training,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            catalog_path: None,
            model_dir: default_model_dir(),
            transcript_path: default_transcript_path(),
            confidence_threshold: default_threshold(),
            session_idle_secs: default_session_idle_secs(),
            retrain: false,
            training: TrainingConfig::default(),
        }
    }
}
