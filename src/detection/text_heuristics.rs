//! Text heuristics: rule-based misinformation signals
//!
//! Scores text on surface features that correlate with fabricated or
//! manipulative writing: sensational hooks, unsourced appeals to authority,
//! shouting (all-caps words, exclamation runs). Verifiable citations pull
//! the score back up. Purely lexical, so fully deterministic.

use super::{unsupported, AnalysisContext, DetectionDetails, DetectionOutput, DetectionStrategy, RawScore};
use crate::content::{ContentKind, ContentSubmission};
use crate::VeracityResult;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

const BASELINE: f64 = 0.75;

static SENSATIONAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(shocking|you won'?t believe|miracle cure|secret (?:cure|plan|they)|they don'?t want you to know|bombshell|exposed|100% (?:proof|proven|guaranteed)|wake up|share before (?:it'?s|they) (?:deleted|removed)|mainstream media (?:won'?t|will not))\b",
    )
    .unwrap()
});

static UNSOURCED_RE: Lazy<Regex> = Lazy::new(|| {
    // Appeals to unnamed authority
    Regex::new(
        r"(?i)\b(experts (?:say|agree|warn)|sources (?:say|claim|confirm)|studies (?:show|prove)|scientists (?:say|agree)|everyone knows|it is (?:known|said) that|doctors are (?:hiding|silent))\b",
    )
    .unwrap()
});

static CITATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(https?://[^\s)]+|\bdoi:\s*\S+|\b[Aa]ccording to [A-Z][\w.]+|\[\d{1,3}\])").unwrap()
});

static CAPS_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z]{3,}\b").unwrap());

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());

/// Individual lexical signals extracted from one text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextSignals {
    pub words: usize,
    pub sensational_hits: Vec<String>,
    pub unsourced_hits: Vec<String>,
    pub citations: usize,
    pub caps_ratio: f64,
    pub exclamations: usize,
}

impl TextSignals {
    pub fn extract(text: &str) -> Self {
        let words = WORD_RE.find_iter(text).count();
        let caps_words = CAPS_WORD_RE.find_iter(text).count();
        let caps_ratio = if words == 0 {
            0.0
        } else {
            caps_words as f64 / words as f64
        };

        Self {
            words,
            sensational_hits: SENSATIONAL_RE
                .find_iter(text)
                .map(|m| m.as_str().to_lowercase())
                .collect(),
            unsourced_hits: UNSOURCED_RE
                .find_iter(text)
                .map(|m| m.as_str().to_lowercase())
                .collect(),
            citations: CITATION_RE.find_iter(text).count(),
            caps_ratio,
            exclamations: text.matches('!').count(),
        }
    }

    /// Combine signals into an authenticity estimate
    pub fn score(&self) -> RawScore {
        let mut score = BASELINE;
        score -= (0.12 * self.sensational_hits.len() as f64).min(0.36);
        score -= (0.08 * self.unsourced_hits.len() as f64).min(0.24);

        let per_hundred_words = if self.words == 0 {
            0.0
        } else {
            self.exclamations as f64 * 100.0 / self.words as f64
        };
        score -= (per_hundred_words * 0.03).min(0.15);

        // Short acronyms are normal; only heavy shouting counts
        if self.caps_ratio > 0.1 {
            score -= ((self.caps_ratio - 0.1) * 0.5).min(0.15);
        }

        score += (0.05 * self.citations as f64).min(0.15);
        RawScore::saturating(score.clamp(0.02, 0.98))
    }

    fn indicators(&self) -> Vec<String> {
        let mut out = Vec::new();
        for hit in &self.sensational_hits {
            out.push(format!("Sensational phrasing: \"{}\"", hit));
        }
        for hit in &self.unsourced_hits {
            out.push(format!("Unsourced appeal to authority: \"{}\"", hit));
        }
        if self.exclamations >= 3 {
            out.push(format!("{} exclamation marks", self.exclamations));
        }
        if self.caps_ratio > 0.1 {
            out.push(format!("{:.0}% of words in capitals", self.caps_ratio * 100.0));
        }
        if self.citations > 0 {
            out.push(format!("{} verifiable citation(s)", self.citations));
        }
        out
    }
}

/// Lexical misinformation scorer for text submissions
#[derive(Debug, Default)]
pub struct TextHeuristicStrategy;

impl TextHeuristicStrategy {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DetectionStrategy for TextHeuristicStrategy {
    fn name(&self) -> &str {
        "text-heuristics"
    }

    fn supports(&self, kind: ContentKind) -> bool {
        kind == ContentKind::Text
    }

    async fn analyze(
        &self,
        submission: &ContentSubmission,
        ctx: &AnalysisContext,
    ) -> VeracityResult<DetectionOutput> {
        let text = submission
            .text_payload()
            .ok_or_else(|| unsupported(self.name(), "payload is not inline text"))?;
        ctx.ensure_active(self.name())?;

        let signals = TextSignals::extract(text);
        let score = signals.score();
        let indicators = signals.indicators();

        let rationale = if indicators.is_empty() {
            "No lexical manipulation signals were found.".to_string()
        } else {
            format!(
                "Found {} lexical signal(s) across {} words.",
                indicators.len(),
                signals.words
            )
        };

        Ok(DetectionOutput::new(score, rationale).with_details(DetectionDetails {
            method: "Lexical signal analysis".into(),
            model_used: format!("{} v{}", self.name(), self.version()),
            key_indicators: indicators,
            technical_analysis: format!(
                "sensational={}, unsourced={}, citations={}, caps_ratio={:.2}, exclamations={}",
                signals.sensational_hits.len(),
                signals.unsourced_hits.len(),
                signals.citations,
                signals.caps_ratio,
                signals.exclamations
            ),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::BinaryHandle;

    #[test]
    fn test_neutral_text_scores_baseline() {
        let s = TextSignals::extract("The city council approved the transit budget on Tuesday.");
        assert!(s.sensational_hits.is_empty());
        assert!(s.unsourced_hits.is_empty());
        assert!((s.score().value() - BASELINE).abs() < 1e-9);
    }

    #[test]
    fn test_sensational_text_scores_low() {
        let text = "SHOCKING!!! Doctors are hiding this MIRACLE CURE. Experts say they don't want you to know. WAKE UP!!!";
        let s = TextSignals::extract(text);
        assert!(!s.sensational_hits.is_empty());
        assert!(!s.unsourced_hits.is_empty());
        assert!(s.score().value() <= 0.4, "score was {}", s.score());
    }

    #[test]
    fn test_citations_raise_score() {
        let plain = TextSignals::extract("Studies show the policy reduced costs.");
        let cited = TextSignals::extract(
            "Studies show the policy reduced costs [1]. According to Reuters, see https://example.org/report",
        );
        assert!(cited.citations >= 2);
        assert!(cited.score() > plain.score());
    }

    #[tokio::test]
    async fn test_strategy_rejects_binary_payload() {
        let strategy = TextHeuristicStrategy::new();
        let image = ContentSubmission::binary(
            ContentKind::Image,
            BinaryHandle::new("a.png", "image/png", 10),
        );
        let err = strategy.analyze(&image, &AnalysisContext::new()).await.unwrap_err();
        assert!(matches!(err, crate::VeracityError::UnsupportedContent { .. }));
    }

    #[tokio::test]
    async fn test_strategy_reports_details() {
        let strategy = TextHeuristicStrategy::new();
        let out = strategy
            .analyze(
                &ContentSubmission::text("Bombshell: sources say the vote was rigged!"),
                &AnalysisContext::new(),
            )
            .await
            .unwrap();
        let details = out.details.unwrap();
        assert!(details.key_indicators.iter().any(|i| i.contains("bombshell")));
        assert!(out.score.value() < BASELINE);
    }
}
