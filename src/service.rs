//! Verification service: the façade callers talk to
//!
//! `submit` runs the orchestrator and records the result only once the
//! analysis has fully completed. Failed submissions propagate their typed
//! error and never touch the history.

use crate::config::VeracityConfig;
use crate::content::ContentSubmission;
use crate::engine::registry::StrategyRegistry;
use crate::engine::{AnalysisOrchestrator, AnalysisResult};
use crate::history::{HistoryQuery, HistoryStats, HistoryStore};
use crate::VeracityResult;
use std::path::PathBuf;
use std::sync::Arc;

/// Cheap to clone; clones share the orchestrator and the history
#[derive(Clone)]
pub struct VerificationService {
    orchestrator: Arc<AnalysisOrchestrator>,
    history: Arc<HistoryStore>,
    history_path: Option<PathBuf>,
}

impl VerificationService {
    /// Build a service, restoring the history snapshot if one is configured
    pub async fn new(registry: StrategyRegistry, config: &VeracityConfig) -> VeracityResult<Self> {
        let orchestrator = AnalysisOrchestrator::new(registry, config)?;

        let history = match &config.history_path {
            Some(path) => {
                HistoryStore::load_snapshot(path, config.history_capacity, orchestrator.policy())
                    .await?
            }
            None => match config.history_capacity {
                Some(cap) => HistoryStore::with_capacity(cap),
                None => HistoryStore::new(),
            },
        };

        tracing::info!(
            "Verification service ready: strategies {:?}, timeout {}ms, {} result(s) in history",
            orchestrator.registry(),
            config.strategy_timeout_ms,
            history.len().await
        );

        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            history: Arc::new(history),
            history_path: config.history_path.clone(),
        })
    }

    /// Seeded mock strategy for every kind, seeded from `config.mock_seed`
    pub async fn with_mocks(config: &VeracityConfig) -> VeracityResult<Self> {
        Self::new(StrategyRegistry::with_mocks(config.mock_seed), config).await
    }

    /// Analyze one submission and record the result
    pub async fn submit(&self, submission: ContentSubmission) -> VeracityResult<AnalysisResult> {
        let result = self.orchestrator.run(submission).await?;
        self.history.append(result.clone()).await;

        if let Some(path) = &self.history_path {
            if let Err(e) = self.history.save_snapshot(path).await {
                tracing::warn!("Failed to save history snapshot to {}: {}", path.display(), e);
            }
        }

        Ok(result)
    }

    pub async fn history(&self, query: &HistoryQuery) -> Vec<AnalysisResult> {
        self.history.list(query).await
    }

    pub async fn stats(&self) -> HistoryStats {
        self.history.stats().await
    }

    pub fn orchestrator(&self) -> &AnalysisOrchestrator {
        &self.orchestrator
    }
}
