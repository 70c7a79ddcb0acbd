//! # Veracity Engine: Analysis Orchestrator
//!
//! One submission in, one immutable [`AnalysisResult`] out:
//!
//! - `registry`: content kind → bound detection strategy
//! - `scoring`: raw score → verdict, confidence and signal band
//! - `explanation`: standard explanation template
//!
//! The orchestrator has no side effects. Recording results is the
//! service's job, so a failed run can never leave anything behind.

pub mod explanation;
pub mod registry;
pub mod scoring;

use crate::config::VeracityConfig;
use crate::content::ContentSubmission;
use crate::detection::{AnalysisContext, DetectionDetails, RawScore};
use crate::{VeracityError, VeracityResult};
use chrono::{DateTime, Utc};
use registry::StrategyRegistry;
use scoring::{ScoringPolicy, Verdict};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

// ─── Analysis Result ───────────────────────────────────────────────

/// Outcome of one completed analysis
///
/// Verdict and confidence are always derived together from `raw_score`;
/// there is no way to construct a result with one set independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    id: Uuid,
    submission: ContentSubmission,
    verdict: Verdict,
    confidence: u8,
    explanation: String,
    input_preview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    detection_details: Option<DetectionDetails>,
    strategy: String,
    raw_score: RawScore,
    completed_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn submission(&self) -> &ContentSubmission {
        &self.submission
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn confidence(&self) -> u8 {
        self.confidence
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn input_preview(&self) -> &str {
        &self.input_preview
    }

    pub fn detection_details(&self) -> Option<&DetectionDetails> {
        self.detection_details.as_ref()
    }

    /// Name of the strategy that produced the score
    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    pub fn raw_score(&self) -> RawScore {
        self.raw_score
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Whether a stored result still holds together under `policy`
    ///
    /// Verdict and confidence must be what `policy` derives from the raw
    /// score, the explanation non-empty, the submission well formed and the
    /// completion no earlier than the submission.
    pub fn is_consistent_with(&self, policy: &ScoringPolicy) -> bool {
        let assessment = policy.assess(self.raw_score);
        assessment.verdict == self.verdict
            && assessment.confidence == self.confidence
            && !self.explanation.trim().is_empty()
            && self.completed_at >= self.submission.submitted_at()
            && self.submission.validate().is_ok()
    }
}

// ─── Orchestrator ──────────────────────────────────────────────────

pub struct AnalysisOrchestrator {
    registry: StrategyRegistry,
    policy: ScoringPolicy,
    timeout: Duration,
}

impl AnalysisOrchestrator {
    pub fn new(registry: StrategyRegistry, config: &VeracityConfig) -> VeracityResult<Self> {
        config.validate()?;
        Ok(Self::with_policy(
            registry,
            ScoringPolicy::from_config(config)?,
            config.strategy_timeout(),
        ))
    }

    pub fn with_policy(registry: StrategyRegistry, policy: ScoringPolicy, timeout: Duration) -> Self {
        Self {
            registry,
            policy,
            timeout,
        }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Validate, score and explain one submission
    pub async fn run(&self, submission: ContentSubmission) -> VeracityResult<AnalysisResult> {
        let kind = submission.kind();

        // ── Step 1: Validate the payload against the declared kind ──
        submission.validate()?;

        // ── Step 2: Resolve the strategy bound to the kind ──
        let strategy = self.registry.resolve(kind)?;
        tracing::debug!(
            "Analyzing {} submission with {} v{}",
            kind,
            strategy.name(),
            strategy.version()
        );

        // ── Step 3: Run it inside the time budget ──
        let ctx = AnalysisContext::new();
        let output = match tokio::time::timeout(self.timeout, strategy.analyze(&submission, &ctx)).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::warn!("{} failed on {} content: {}", strategy.name(), kind, e);
                return Err(e);
            }
            Err(_) => {
                // The in-flight future is already dropped; tell anything it spawned
                ctx.cancellation.cancel();
                let timeout_ms = self.timeout.as_millis() as u64;
                tracing::warn!(
                    "{} exceeded its {}ms budget on {} content",
                    strategy.name(),
                    timeout_ms,
                    kind
                );
                return Err(VeracityError::AnalysisTimeout {
                    strategy: strategy.name().to_string(),
                    timeout_ms,
                });
            }
        };

        // ── Step 4: Derive verdict and confidence from the raw score ──
        let assessment = self.policy.assess(output.score);

        // ── Step 5: Explain ──
        let explanation = explanation::explain(
            strategy.name(),
            strategy.version(),
            kind,
            &assessment,
            &output,
        );

        // ── Step 6: Stamp ──
        let completed_at = Utc::now().max(submission.submitted_at());
        let result = AnalysisResult {
            id: Uuid::new_v4(),
            input_preview: submission.preview(),
            verdict: assessment.verdict,
            confidence: assessment.confidence,
            explanation,
            detection_details: output.details,
            strategy: strategy.name().to_string(),
            raw_score: output.score,
            completed_at,
            submission,
        };

        tracing::info!(
            "Analysis {} complete: {} {} at {}% ({}, score {})",
            result.id,
            kind,
            result.verdict,
            result.confidence,
            result.strategy,
            result.raw_score
        );

        Ok(result)
    }
}
