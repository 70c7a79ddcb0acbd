//! Detection strategies: the pluggable scorers behind every verdict
//!
//! A strategy looks at one submission and estimates how likely it is to be
//! authentic, as a [`RawScore`] in `[0, 1]`. Strategies never decide the
//! verdict or the confidence; that mapping belongs to the orchestrator so
//! any scorer can be swapped in without touching it.
//!
//! Strategies are:
//! - **Deterministic**: identical input under the same version scores identically
//! - **Bounded**: they complete or fail, and honor the [`CancellationFlag`]
//! - **Kind-scoped**: [`DetectionStrategy::supports`] gates registration

pub mod media_metadata;
pub mod mock;
pub mod text_heuristics;

pub use media_metadata::MediaMetadataStrategy;
pub use mock::{FixedFailure, FixedScoreStrategy, SeededMockStrategy};
pub use text_heuristics::TextHeuristicStrategy;

use crate::content::{ContentKind, ContentSubmission};
use crate::{VeracityError, VeracityResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ─── Raw Score ─────────────────────────────────────────────────────

/// Estimated probability that content is authentic, always within `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct RawScore(f64);

impl RawScore {
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Clamp into range; NaN collapses to the midpoint
    pub fn saturating(value: f64) -> Self {
        if value.is_nan() {
            Self(0.5)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for RawScore {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("raw score {} outside [0, 1]", value))
    }
}

impl From<RawScore> for f64 {
    fn from(score: RawScore) -> Self {
        score.0
    }
}

impl std::fmt::Display for RawScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

// ─── Strategy Output ───────────────────────────────────────────────

/// How a strategy reached its score, surfaced to the caller as-is
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionDetails {
    pub method: String,
    pub model_used: String,
    pub key_indicators: Vec<String>,
    pub technical_analysis: String,
}

/// What a strategy returns for one submission
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOutput {
    pub score: RawScore,
    /// One or two sentences folded into the result's explanation
    pub rationale: String,
    pub details: Option<DetectionDetails>,
}

impl DetectionOutput {
    pub fn new(score: RawScore, rationale: impl Into<String>) -> Self {
        Self {
            score,
            rationale: rationale.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: DetectionDetails) -> Self {
        self.details = Some(details);
        self
    }
}

// ─── Cancellation ──────────────────────────────────────────────────

/// Cooperative cancellation flag shared between the orchestrator and a strategy
///
/// Raised when the strategy's time budget runs out. Strategies that do work
/// in several steps check it between steps and stop early.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Per-invocation context handed to a strategy
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    pub cancellation: CancellationFlag,
}

impl AnalysisContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Fail with `StrategyUnavailable` if the invocation was cancelled
    pub fn ensure_active(&self, strategy: &str) -> VeracityResult<()> {
        if self.is_cancelled() {
            Err(VeracityError::StrategyUnavailable {
                strategy: strategy.to_string(),
                reason: "analysis cancelled".into(),
            })
        } else {
            Ok(())
        }
    }
}

// ─── Strategy Trait ────────────────────────────────────────────────

#[async_trait]
pub trait DetectionStrategy: Send + Sync {
    /// Human-readable name for logging and explanations
    fn name(&self) -> &str;

    /// Bumped whenever the scoring behavior changes
    fn version(&self) -> &str {
        "1"
    }

    /// Whether this strategy can score the given kind
    fn supports(&self, kind: ContentKind) -> bool;

    /// Score one submission
    async fn analyze(
        &self,
        submission: &ContentSubmission,
        ctx: &AnalysisContext,
    ) -> VeracityResult<DetectionOutput>;
}

/// Build an `UnsupportedContent` error for the given strategy
pub(crate) fn unsupported(strategy: &str, reason: impl Into<String>) -> VeracityError {
    VeracityError::UnsupportedContent {
        strategy: strategy.to_string(),
        reason: reason.into(),
    }
}
