//! Media metadata heuristics: image, audio and video handles
//!
//! The core never sees media bytes, only the handle: file name, MIME type
//! and size. That is still enough to catch a useful class of fakes:
//!
//! 1. **Generator markers**: file names left by synthesis tools
//!    (deepfake, faceswap, diffusion models, voice cloning services)
//! 2. **Container mismatch**: extension disagrees with the declared kind
//! 3. **Unknown encodings**: MIME subtype outside the usual capture formats
//! 4. **Implausible size**: too small to be a genuine capture of the kind

use super::{unsupported, AnalysisContext, DetectionDetails, DetectionOutput, DetectionStrategy, RawScore};
use crate::content::{BinaryHandle, ContentKind, ContentSubmission};
use crate::VeracityResult;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

const BASELINE: f64 = 0.8;

static GENERATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:^|[-_. ])(deep[-_ ]?fake|face[-_ ]?swap|midjourney|dall[-_ ]?e|stable[-_ ]?diffusion|sdxl|runway(?:ml)?|sora|elevenlabs|voice[-_ ]?clone|ai[-_ ]?generated|synthetic|faceapp|reface|lip[-_ ]?sync)(?:$|[-_. ])",
    )
    .unwrap()
});

/// Common capture/distribution encodings per kind
fn known_subtypes(kind: ContentKind) -> &'static [&'static str] {
    match kind {
        ContentKind::Image => &[
            "jpeg", "jpg", "png", "gif", "webp", "bmp", "tiff", "heic", "heif", "avif",
        ],
        ContentKind::Audio => &[
            "mpeg", "mp3", "wav", "x-wav", "wave", "ogg", "flac", "x-flac", "aac", "mp4",
            "x-m4a", "webm", "opus", "aiff", "x-aiff",
        ],
        ContentKind::Video => &[
            "mp4", "webm", "quicktime", "x-matroska", "x-msvideo", "mpeg", "ogg", "3gpp",
            "x-flv",
        ],
        ContentKind::Text => &[],
    }
}

/// Smallest believable size for a genuine capture
fn minimum_plausible_bytes(kind: ContentKind) -> u64 {
    match kind {
        ContentKind::Image => 1_024,
        ContentKind::Audio => 4_096,
        ContentKind::Video => 32_768,
        ContentKind::Text => 1,
    }
}

/// Findings for one media handle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaFindings {
    pub generator_marker: Option<String>,
    pub extension_mismatch: Option<String>,
    pub unknown_subtype: Option<String>,
    pub implausible_size: bool,
}

impl MediaFindings {
    pub fn inspect(kind: ContentKind, handle: &BinaryHandle) -> Self {
        let generator_marker = GENERATOR_RE
            .captures(&handle.file_name)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_lowercase());

        let extension_mismatch = handle.extension().and_then(|ext| {
            match ContentKind::from_extension(ext) {
                Some(found) if found != kind => Some(format!(".{} looks like {}", ext, found)),
                _ => None,
            }
        });

        let minor = handle.mime_minor();
        let unknown_subtype = if known_subtypes(kind).contains(&minor.as_str()) {
            None
        } else {
            Some(handle.mime_type.clone())
        };

        Self {
            generator_marker,
            extension_mismatch,
            unknown_subtype,
            implausible_size: handle.size_bytes < minimum_plausible_bytes(kind),
        }
    }

    pub fn score(&self) -> RawScore {
        let mut score = BASELINE;
        if self.generator_marker.is_some() {
            score -= 0.45;
        }
        if self.extension_mismatch.is_some() {
            score -= 0.2;
        }
        if self.unknown_subtype.is_some() {
            score -= 0.1;
        }
        if self.implausible_size {
            score -= 0.15;
        }
        RawScore::saturating(score.clamp(0.02, 0.98))
    }

    fn indicators(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(marker) = &self.generator_marker {
            out.push(format!("Synthesis tool marker in file name: \"{}\"", marker));
        }
        if let Some(mismatch) = &self.extension_mismatch {
            out.push(format!("Container mismatch: {}", mismatch));
        }
        if let Some(mime) = &self.unknown_subtype {
            out.push(format!("Uncommon encoding: {}", mime));
        }
        if self.implausible_size {
            out.push("File too small for a genuine capture".into());
        }
        out
    }
}

/// Handle-metadata scorer for image, audio and video submissions
#[derive(Debug, Default)]
pub struct MediaMetadataStrategy;

impl MediaMetadataStrategy {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DetectionStrategy for MediaMetadataStrategy {
    fn name(&self) -> &str {
        "media-metadata"
    }

    fn supports(&self, kind: ContentKind) -> bool {
        kind.is_binary()
    }

    async fn analyze(
        &self,
        submission: &ContentSubmission,
        ctx: &AnalysisContext,
    ) -> VeracityResult<DetectionOutput> {
        let kind = submission.kind();
        if !self.supports(kind) {
            return Err(unsupported(self.name(), format!("{} content has no media handle", kind)));
        }
        let handle = submission
            .binary_handle()
            .ok_or_else(|| unsupported(self.name(), "payload is not a binary handle"))?;
        ctx.ensure_active(self.name())?;

        let findings = MediaFindings::inspect(kind, handle);
        let indicators = findings.indicators();
        let rationale = if indicators.is_empty() {
            format!("The {} handle carries no manipulation markers.", kind)
        } else {
            format!("The {} handle shows {} manipulation marker(s).", kind, indicators.len())
        };

        Ok(DetectionOutput::new(findings.score(), rationale).with_details(DetectionDetails {
            method: format!("{} container metadata inspection", kind),
            model_used: format!("{} v{}", self.name(), self.version()),
            key_indicators: indicators,
            technical_analysis: format!(
                "file={}, mime={}, size={} bytes",
                handle.file_name, handle.mime_type, handle.size_bytes
            ),
        }))
    }
}
