//! Human-readable explanation for a result
//!
//! Standard template (verdict headline, strategy, signal band, score) with
//! the strategy's own rationale and indicators appended. Never empty.

use super::scoring::{Assessment, Verdict};
use crate::content::ContentKind;
use crate::detection::DetectionOutput;

/// Indicators quoted in the explanation; the full list stays in the details
const MAX_INDICATORS: usize = 3;

pub fn explain(
    strategy: &str,
    version: &str,
    kind: ContentKind,
    assessment: &Assessment,
    output: &DetectionOutput,
) -> String {
    let headline = match assessment.verdict {
        Verdict::Real => "Likely authentic.",
        Verdict::Fake => "Likely fabricated or manipulated.",
        Verdict::Uncertain => "Inconclusive: the signal falls inside the ambiguity band.",
    };

    let mut text = format!(
        "{} {} v{} scored this {} content at {} ({} signal, {}% confidence).",
        headline,
        strategy,
        version,
        kind,
        output.score,
        assessment.band,
        assessment.confidence
    );

    let rationale = output.rationale.trim();
    if !rationale.is_empty() {
        text.push(' ');
        text.push_str(rationale);
    }

    if let Some(details) = &output.details {
        let shown: Vec<&str> = details
            .key_indicators
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .take(MAX_INDICATORS)
            .collect();
        if !shown.is_empty() {
            text.push_str(&format!(" Key indicators: {}.", shown.join("; ")));
        }
    }

    if assessment.verdict == Verdict::Uncertain {
        text.push_str(" Consider corroborating with an independent source.");
    }

    text
}
