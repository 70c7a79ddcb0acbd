//! Verdict and confidence derivation
//!
//! Turns a strategy's raw authenticity score `s ∈ [0, 1]` into a verdict and
//! a 0-100 confidence. Both come from the same score in one step so they can
//! never disagree:
//!
//! - confidence = `round(s*100)` when `s ≥ 0.5`, else `round((1-s)*100)`
//! - verdict = real when `s ≥ real_threshold`, fake when `s ≤ fake_threshold`,
//!   uncertain otherwise
//!
//! The ambiguity band is half-open, `[low, high)`. With the defaults a score
//! of exactly 0.6 is real at 60% and 0.4 is fake at 60%, so 60 sits outside
//! the band while every uncertain result reports 50-59.

use crate::config::VeracityConfig;
use crate::detection::RawScore;
use crate::{VeracityError, VeracityResult};
use serde::{Deserialize, Serialize};

/// Confidence at or above which a decided verdict counts as a strong signal
pub const STRONG_SIGNAL: u8 = 85;

// ─── Verdict ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Real,
    Fake,
    Uncertain,
}

impl Verdict {
    pub const ALL: [Verdict; 3] = [Self::Real, Self::Fake, Self::Uncertain];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Real => "real",
            Self::Fake => "fake",
            Self::Uncertain => "uncertain",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Ambiguity Band ────────────────────────────────────────────────

/// Confidence range `[low, high)` that maps to an uncertain verdict
///
/// Serialized as a two-element array, `[40, 60]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[u8; 2]", into = "[u8; 2]")]
pub struct AmbiguityBand {
    low: u8,
    high: u8,
}

impl AmbiguityBand {
    pub fn new(low: u8, high: u8) -> VeracityResult<Self> {
        if low >= high || high > 100 {
            return Err(VeracityError::Config(format!(
                "ambiguity band [{}, {}] must satisfy low < high ≤ 100",
                low, high
            )));
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> u8 {
        self.low
    }

    pub fn high(&self) -> u8 {
        self.high
    }

    pub fn contains(&self, confidence: u8) -> bool {
        confidence >= self.low && confidence < self.high
    }
}

impl Default for AmbiguityBand {
    fn default() -> Self {
        Self { low: 40, high: 60 }
    }
}

impl TryFrom<[u8; 2]> for AmbiguityBand {
    type Error = VeracityError;

    fn try_from([low, high]: [u8; 2]) -> Result<Self, Self::Error> {
        Self::new(low, high)
    }
}

impl From<AmbiguityBand> for [u8; 2] {
    fn from(band: AmbiguityBand) -> Self {
        [band.low, band.high]
    }
}

// ─── Assessment ────────────────────────────────────────────────────

/// Coarse strength of the signal, used in explanations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalBand {
    Strong,
    Moderate,
    Ambiguous,
}

impl std::fmt::Display for SignalBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strong => write!(f, "strong"),
            Self::Moderate => write!(f, "moderate"),
            Self::Ambiguous => write!(f, "ambiguous"),
        }
    }
}

/// Verdict, confidence and signal band derived from one raw score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub verdict: Verdict,
    pub confidence: u8,
    pub band: SignalBand,
}

// ─── Policy ────────────────────────────────────────────────────────

/// Validated thresholds and ambiguity band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringPolicy {
    band: AmbiguityBand,
    real_threshold: f64,
    fake_threshold: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            band: AmbiguityBand::default(),
            real_threshold: 0.6,
            fake_threshold: 0.4,
        }
    }
}

impl ScoringPolicy {
    pub fn new(band: AmbiguityBand, real_threshold: f64, fake_threshold: f64) -> VeracityResult<Self> {
        let in_unit = |t: f64| t.is_finite() && (0.0..=1.0).contains(&t);
        if !in_unit(real_threshold) || !in_unit(fake_threshold) {
            return Err(VeracityError::Config(format!(
                "thresholds must lie in [0, 1] (real={}, fake={})",
                real_threshold, fake_threshold
            )));
        }
        if fake_threshold >= 0.5 || real_threshold <= 0.5 {
            return Err(VeracityError::Config(format!(
                "fake threshold must be below 0.5 and real threshold above it (real={}, fake={})",
                real_threshold, fake_threshold
            )));
        }
        if band.low() > 50 || band.high() <= 50 {
            return Err(VeracityError::Config(format!(
                "ambiguity band [{}, {}] must straddle 50",
                band.low(),
                band.high()
            )));
        }

        // The confidence reached exactly at each threshold is where the band ends
        let at_real = confidence_of(real_threshold);
        let at_fake = confidence_of(fake_threshold);
        if at_real != band.high() || at_fake != band.high() {
            return Err(VeracityError::Config(format!(
                "ambiguity band upper bound {} disagrees with thresholds \
                 (real {} gives {}%, fake {} gives {}%)",
                band.high(),
                real_threshold,
                at_real,
                fake_threshold,
                at_fake
            )));
        }

        Ok(Self {
            band,
            real_threshold,
            fake_threshold,
        })
    }

    pub fn from_config(config: &VeracityConfig) -> VeracityResult<Self> {
        Self::new(config.ambiguity_band, config.real_threshold, config.fake_threshold)
    }

    pub fn band(&self) -> AmbiguityBand {
        self.band
    }

    /// Symmetric confidence: a score and its complement get the same value
    pub fn confidence_for(&self, score: RawScore) -> u8 {
        confidence_of(score.value())
    }

    pub fn verdict_for(&self, score: RawScore) -> Verdict {
        let s = score.value();
        if s >= self.real_threshold {
            Verdict::Real
        } else if s <= self.fake_threshold {
            Verdict::Fake
        } else {
            Verdict::Uncertain
        }
    }

    /// Derive verdict and confidence together
    pub fn assess(&self, score: RawScore) -> Assessment {
        let verdict = self.verdict_for(score);
        let mut confidence = self.confidence_for(score);

        let band = match verdict {
            Verdict::Uncertain => {
                // Scores just below the real threshold round up to the band's edge
                confidence = confidence.min(self.band.high() - 1);
                SignalBand::Ambiguous
            }
            _ if confidence >= STRONG_SIGNAL => SignalBand::Strong,
            _ => SignalBand::Moderate,
        };

        Assessment {
            verdict,
            confidence,
            band,
        }
    }
}

fn confidence_of(s: f64) -> u8 {
    let leaning = if s >= 0.5 { s } else { 1.0 - s };
    (leaning * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(s: f64) -> RawScore {
        RawScore::new(s).unwrap()
    }

    #[test]
    fn test_threshold_boundaries() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.verdict_for(score(0.6)), Verdict::Real);
        assert_eq!(policy.verdict_for(score(0.4)), Verdict::Fake);
        assert_eq!(policy.verdict_for(score(0.59)), Verdict::Uncertain);
        assert_eq!(policy.verdict_for(score(0.41)), Verdict::Uncertain);
        assert_eq!(policy.verdict_for(score(1.0)), Verdict::Real);
        assert_eq!(policy.verdict_for(score(0.0)), Verdict::Fake);
    }

    #[test]
    fn test_scenario_scores() {
        let policy = ScoringPolicy::default();
        let a = policy.assess(score(0.95));
        assert_eq!((a.verdict, a.confidence, a.band), (Verdict::Real, 95, SignalBand::Strong));

        let a = policy.assess(score(0.5));
        assert_eq!((a.verdict, a.confidence), (Verdict::Uncertain, 50));

        let a = policy.assess(score(0.1));
        assert_eq!((a.verdict, a.confidence), (Verdict::Fake, 90));
    }

    #[test]
    fn test_confidence_is_symmetric() {
        let policy = ScoringPolicy::default();
        for i in 0..=1000 {
            let s = i as f64 / 1000.0;
            let c = policy.confidence_for(score(s));
            assert!(c <= 100);
            assert_eq!(c, policy.confidence_for(score(1.0 - s)), "s = {}", s);
        }
    }

    #[test]
    fn test_uncertain_iff_in_band() {
        let policy = ScoringPolicy::default();
        for i in 0..=1000 {
            let a = policy.assess(score(i as f64 / 1000.0));
            assert_eq!(
                a.verdict == Verdict::Uncertain,
                policy.band().contains(a.confidence),
                "s = {} gave {:?}",
                i as f64 / 1000.0,
                a
            );
        }
    }

    #[test]
    fn test_just_below_real_threshold_stays_in_band() {
        let a = ScoringPolicy::default().assess(score(0.597));
        assert_eq!(a.verdict, Verdict::Uncertain);
        assert_eq!(a.confidence, 59);
    }

    #[test]
    fn test_custom_policy() {
        let policy = ScoringPolicy::new(AmbiguityBand::new(30, 75).unwrap(), 0.75, 0.25).unwrap();
        assert_eq!(policy.verdict_for(score(0.7)), Verdict::Uncertain);
        let a = policy.assess(score(0.75));
        assert_eq!((a.verdict, a.confidence), (Verdict::Real, 75));
    }

    #[test]
    fn test_inconsistent_policies_rejected() {
        let band = AmbiguityBand::default();
        assert!(ScoringPolicy::new(band, 0.7, 0.4).is_err());
        assert!(ScoringPolicy::new(band, 0.6, 0.3).is_err());
        assert!(ScoringPolicy::new(band, 1.5, 0.4).is_err());
        assert!(ScoringPolicy::new(band, 0.4, 0.6).is_err());
        assert!(ScoringPolicy::new(band, f64::NAN, 0.4).is_err());
        assert!(AmbiguityBand::new(60, 40).is_err());
        assert!(AmbiguityBand::new(40, 101).is_err());
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(serde_json::to_string(&Verdict::Uncertain).unwrap(), "\"uncertain\"");
        assert_eq!(serde_json::to_string(&AmbiguityBand::default()).unwrap(), "[40,60]");
        assert!(serde_json::from_str::<AmbiguityBand>("[70,20]").is_err());
    }
}
