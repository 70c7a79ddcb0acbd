//! Development strategies: seeded mock and fixed-score scorer
//!
//! `SeededMockStrategy` stands in for a real detector while the product is
//! wired end to end. Its randomness comes from an explicit seed mixed with
//! the content fingerprint, so the same content always scores the same
//! under the same seed. `FixedScoreStrategy` pins the score (and optionally
//! latency or a failure) for scenario tests.

use super::{unsupported, AnalysisContext, DetectionDetails, DetectionOutput, DetectionStrategy, RawScore};
use crate::content::{ContentKind, ContentSubmission};
use crate::{VeracityError, VeracityResult};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::time::Duration;

const TEXT_SIGNALS: &[&str] = &[
    "Claim phrasing matches known rumor templates",
    "Named sources are verifiable",
    "Emotional tone above baseline",
    "Consistent dates and figures",
];
const IMAGE_SIGNALS: &[&str] = &[
    "Lighting direction consistent across subjects",
    "Compression artifacts uneven across regions",
    "Metadata timestamps coherent",
    "Edge halos around facial boundary",
];
const AUDIO_SIGNALS: &[&str] = &[
    "Spectral continuity between phonemes",
    "Breathing pattern regularity",
    "Background noise floor consistent",
    "Prosody shifts at splice candidates",
];
const VIDEO_SIGNALS: &[&str] = &[
    "Lip movement aligned with audio track",
    "Blink rate within natural range",
    "Frame-to-frame identity drift",
    "Encoder history consistent with source device",
];

// ─── Seeded Mock ───────────────────────────────────────────────────

/// Reproducible pseudo-random scorer for one content kind
pub struct SeededMockStrategy {
    kind: ContentKind,
    seed: u64,
    name: String,
    latency: Option<Duration>,
}

impl SeededMockStrategy {
    pub fn new(kind: ContentKind, seed: u64) -> Self {
        Self {
            kind,
            seed,
            name: format!("mock-{}", kind),
            latency: None,
        }
    }

    /// Simulate inference latency before scoring
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn rng_for(&self, submission: &ContentSubmission) -> StdRng {
        let digest = submission.digest();
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        StdRng::seed_from_u64(self.seed ^ u64::from_be_bytes(prefix))
    }

    fn signals(&self) -> &'static [&'static str] {
        match self.kind {
            ContentKind::Text => TEXT_SIGNALS,
            ContentKind::Image => IMAGE_SIGNALS,
            ContentKind::Audio => AUDIO_SIGNALS,
            ContentKind::Video => VIDEO_SIGNALS,
        }
    }
}

#[async_trait]
impl DetectionStrategy for SeededMockStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, kind: ContentKind) -> bool {
        kind == self.kind
    }

    async fn analyze(
        &self,
        submission: &ContentSubmission,
        ctx: &AnalysisContext,
    ) -> VeracityResult<DetectionOutput> {
        if submission.kind() != self.kind {
            return Err(unsupported(
                &self.name,
                format!("expected {} content, got {}", self.kind, submission.kind()),
            ));
        }
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        ctx.ensure_active(&self.name)?;

        let mut rng = self.rng_for(submission);
        let score = RawScore::saturating(rng.gen_range(0.0..=1.0));
        let indicators: Vec<String> = self
            .signals()
            .choose_multiple(&mut rng, 2)
            .map(|s| s.to_string())
            .collect();

        tracing::debug!(
            "{} scored {} (seed={}, fingerprint={}…)",
            self.name,
            score,
            self.seed,
            &submission.fingerprint()[..12]
        );

        Ok(DetectionOutput::new(
            score,
            format!("Simulated {} analysis; not backed by a trained model.", self.kind),
        )
        .with_details(DetectionDetails {
            method: format!("Seeded mock {} analysis", self.kind),
            model_used: format!("mock-v{}", self.version()),
            key_indicators: indicators,
            technical_analysis: format!(
                "Pseudo-random score derived from seed {} and the content fingerprint.",
                self.seed
            ),
        }))
    }
}

// ─── Fixed Score ───────────────────────────────────────────────────

/// Failure a [`FixedScoreStrategy`] raises instead of scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedFailure {
    Unsupported,
    Unavailable,
}

/// Always returns the same score, for every kind
pub struct FixedScoreStrategy {
    name: String,
    score: RawScore,
    delay: Option<Duration>,
    failure: Option<FixedFailure>,
}

impl FixedScoreStrategy {
    pub fn new(score: RawScore) -> Self {
        Self {
            name: format!("fixed-{}", score),
            score,
            delay: None,
            failure: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail instead of scoring
    pub fn failing(mut self, failure: FixedFailure) -> Self {
        self.failure = Some(failure);
        self
    }
}

#[async_trait]
impl DetectionStrategy for FixedScoreStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, _kind: ContentKind) -> bool {
        true
    }

    async fn analyze(
        &self,
        _submission: &ContentSubmission,
        ctx: &AnalysisContext,
    ) -> VeracityResult<DetectionOutput> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        ctx.ensure_active(&self.name)?;

        match self.failure {
            Some(FixedFailure::Unsupported) => {
                Err(unsupported(&self.name, "configured to reject all content"))
            }
            Some(FixedFailure::Unavailable) => Err(VeracityError::StrategyUnavailable {
                strategy: self.name.clone(),
                reason: "configured as unavailable".into(),
            }),
            None => Ok(DetectionOutput::new(
                self.score,
                format!("Fixed authenticity score of {}.", self.score),
            )),
        }
    }
}
