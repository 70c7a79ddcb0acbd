//! Service configuration: `veracity.toml`
//!
//! Thresholds, the ambiguity band, the per-strategy time budget and history
//! retention. Every field has a default so a partial file (or no file at
//! all) yields a working service. Keys are snake_case; the camelCase names
//! used on the wire are accepted as aliases.

use crate::engine::scoring::{AmbiguityBand, ScoringPolicy};
use crate::{VeracityError, VeracityResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File names probed by [`VeracityConfig::from_dir`], in order
pub const CONFIG_FILE_NAMES: &[&str] = &["veracity.toml", ".veracity.toml"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VeracityConfig {
    /// Confidence range `[low, high)` reported as uncertain
    #[serde(alias = "ambiguityBand")]
    pub ambiguity_band: AmbiguityBand,

    /// Raw scores at or above this are real
    #[serde(alias = "realThreshold")]
    pub real_threshold: f64,

    /// Raw scores at or below this are fake
    #[serde(alias = "fakeThreshold")]
    pub fake_threshold: f64,

    /// Time budget for a single strategy invocation
    #[serde(alias = "strategyTimeoutMs")]
    pub strategy_timeout_ms: u64,

    /// Seed for the mock strategies
    #[serde(alias = "mockSeed")]
    pub mock_seed: u64,

    /// Keep at most this many results; unbounded when unset
    #[serde(alias = "historyCapacity")]
    pub history_capacity: Option<usize>,

    /// JSON snapshot of the history, loaded at startup and rewritten per submit
    #[serde(alias = "historyPath")]
    pub history_path: Option<PathBuf>,
}

impl Default for VeracityConfig {
    fn default() -> Self {
        Self {
            ambiguity_band: AmbiguityBand::default(),
            real_threshold: 0.6,
            fake_threshold: 0.4,
            strategy_timeout_ms: 30_000,
            mock_seed: 0,
            history_capacity: None,
            history_path: None,
        }
    }
}

impl VeracityConfig {
    /// Load and validate a TOML config file
    pub fn from_file(path: &Path) -> VeracityResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: VeracityConfig = toml::from_str(&content).map_err(|e| {
            VeracityError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Try the well-known file names under `root`, fall back to defaults
    pub fn from_dir(root: &Path) -> Self {
        for name in CONFIG_FILE_NAMES {
            let path = root.join(name);
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}, using defaults", path.display(), e);
                }
            }
        }
        Self::default()
    }

    /// Reject settings under which verdict and confidence could disagree
    pub fn validate(&self) -> VeracityResult<()> {
        if self.strategy_timeout_ms == 0 {
            return Err(VeracityError::Config(
                "strategy_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.history_capacity == Some(0) {
            return Err(VeracityError::Config(
                "history_capacity must be at least 1 when set".into(),
            ));
        }
        ScoringPolicy::from_config(self).map(|_| ())
    }

    pub fn strategy_timeout(&self) -> Duration {
        Duration::from_millis(self.strategy_timeout_ms)
    }
}
