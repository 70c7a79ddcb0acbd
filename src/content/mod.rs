//! Submission model: what callers hand to the service
//!
//! A submission is either inline text or an opaque handle to binary media.
//! The raw bytes never enter the core; only the file name, MIME type and
//! size travel with the handle.

use crate::{VeracityError, VeracityResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Maximum number of characters kept in a result's input preview
pub const PREVIEW_CHARS: usize = 120;

/// How far ahead of the local clock a submission time may be
pub const MAX_CLOCK_SKEW_SECS: i64 = 60;

// ─── Content Kind ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
    Audio,
    Video,
}

impl ContentKind {
    pub const ALL: [ContentKind; 4] = [Self::Text, Self::Image, Self::Audio, Self::Video];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }

    /// Whether submissions of this kind carry a binary handle
    pub fn is_binary(&self) -> bool {
        !matches!(self, Self::Text)
    }

    /// Classify a file extension into a media kind
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp4" | "webm" | "avi" | "mov" | "mkv" | "flv" | "wmv" | "m4v" | "3gp" | "ogv"
            | "mpeg" | "mpg" => Some(Self::Video),
            "mp3" | "wav" | "ogg" | "flac" | "aac" | "m4a" | "wma" | "opus" | "aiff" => {
                Some(Self::Audio)
            }
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "tiff" | "tif" | "webp" | "heic"
            | "heif" | "avif" => Some(Self::Image),
            "txt" | "md" => Some(Self::Text),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Payload ───────────────────────────────────────────────────────

/// Reference to uploaded binary content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryHandle {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl BinaryHandle {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            size_bytes,
        }
    }

    pub fn extension(&self) -> Option<&str> {
        let (stem, ext) = self.file_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            None
        } else {
            Some(ext)
        }
    }

    /// Top-level MIME type (`image` for `image/png`), lower-cased
    pub fn mime_major(&self) -> String {
        self.mime_type
            .split('/')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase()
    }

    /// MIME subtype without parameters (`png` for `image/png; q=1`)
    pub fn mime_minor(&self) -> String {
        self.mime_type
            .split_once('/')
            .map(|(_, minor)| minor.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Payload {
    Text(String),
    Binary(BinaryHandle),
}

// ─── Submission ────────────────────────────────────────────────────

/// A single user-provided item awaiting analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSubmission {
    kind: ContentKind,
    payload: Payload,
    submitted_at: DateTime<Utc>,
}

impl ContentSubmission {
    pub fn new(kind: ContentKind, payload: Payload) -> Self {
        Self::at(kind, payload, Utc::now())
    }

    pub fn at(kind: ContentKind, payload: Payload, submitted_at: DateTime<Utc>) -> Self {
        Self {
            kind,
            payload,
            submitted_at,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(ContentKind::Text, Payload::Text(text.into()))
    }

    pub fn binary(kind: ContentKind, handle: BinaryHandle) -> Self {
        Self::new(kind, Payload::Binary(handle))
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn text_payload(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(t) => Some(t.as_str()),
            Payload::Binary(_) => None,
        }
    }

    pub fn binary_handle(&self) -> Option<&BinaryHandle> {
        match &self.payload {
            Payload::Binary(h) => Some(h),
            Payload::Text(_) => None,
        }
    }

    /// Check that the payload shape agrees with the declared kind and that
    /// the submission time is not ahead of the clock beyond the skew allowance
    pub fn validate(&self) -> VeracityResult<()> {
        let latest = Utc::now() + chrono::Duration::seconds(MAX_CLOCK_SKEW_SECS);
        if self.submitted_at > latest {
            return Err(VeracityError::InvalidSubmission(format!(
                "submission time {} is in the future",
                self.submitted_at.to_rfc3339()
            )));
        }

        match (&self.kind, &self.payload) {
            (ContentKind::Text, Payload::Text(text)) => {
                if text.trim().is_empty() {
                    return Err(VeracityError::InvalidSubmission(
                        "text payload is empty".into(),
                    ));
                }
                Ok(())
            }
            (ContentKind::Text, Payload::Binary(_)) => Err(VeracityError::InvalidSubmission(
                "text submissions must carry inline text, not a binary handle".into(),
            )),
            (kind, Payload::Text(_)) => Err(VeracityError::InvalidSubmission(format!(
                "{} submissions must carry a binary handle, not inline text",
                kind
            ))),
            (kind, Payload::Binary(handle)) => {
                if handle.file_name.trim().is_empty() {
                    return Err(VeracityError::InvalidSubmission(
                        "binary handle has no file name".into(),
                    ));
                }
                if handle.size_bytes == 0 {
                    return Err(VeracityError::InvalidSubmission(format!(
                        "binary handle '{}' is empty",
                        handle.file_name
                    )));
                }
                let major = handle.mime_major();
                if major != kind.as_str() {
                    return Err(VeracityError::InvalidSubmission(format!(
                        "MIME type '{}' does not match declared kind {}",
                        handle.mime_type, kind
                    )));
                }
                Ok(())
            }
        }
    }

    /// Short human-readable preview: leading text, or the file name
    pub fn preview(&self) -> String {
        match &self.payload {
            Payload::Text(text) => {
                let trimmed = text.trim();
                if trimmed.chars().count() <= PREVIEW_CHARS {
                    trimmed.to_string()
                } else {
                    let mut cut: String = trimmed.chars().take(PREVIEW_CHARS).collect();
                    cut.push('…');
                    cut
                }
            }
            Payload::Binary(handle) => handle.file_name.clone(),
        }
    }

    /// SHA-256 over the kind and payload, hex encoded
    ///
    /// Two submissions of the same content share a fingerprint regardless
    /// of when they were submitted.
    pub fn fingerprint(&self) -> String {
        hex::encode(self.digest())
    }

    pub(crate) fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.kind.as_str().as_bytes());
        hasher.update([0u8]);
        match &self.payload {
            Payload::Text(text) => hasher.update(text.as_bytes()),
            Payload::Binary(handle) => {
                hasher.update(handle.file_name.as_bytes());
                hasher.update([0u8]);
                hasher.update(handle.mime_type.as_bytes());
                hasher.update([0u8]);
                hasher.update(handle.size_bytes.to_be_bytes());
            }
        }
        hasher.finalize().into()
    }
}
