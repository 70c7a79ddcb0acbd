//! # veracity: Content Verification Orchestration Core
//!
//! Accepts heterogeneous content (text, image, audio, video), dispatches it
//! to a detection strategy bound to the content kind, turns the strategy's
//! raw authenticity score into a verdict with a confidence and explanation,
//! and keeps a queryable history of completed analyses.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    VerificationService                       │
//! │        submit  ·  history  ·  stats   (api DTOs on top)      │
//! │  ┌──────────────────────────────┐   ┌─────────────────────┐  │
//! │  │      AnalysisOrchestrator    │   │    HistoryStore     │  │
//! │  │ validate → resolve → run     │──▶│ append (1 writer)   │  │
//! │  │ (timeout) → score → explain  │   │ list / stats (RO)   │  │
//! │  └──────────────┬───────────────┘   └─────────────────────┘  │
//! │                 │                                            │
//! │  ┌──────────────▼───────────────────────────────────────────┐ │
//! │  │ StrategyRegistry: text │ image │ audio │ video           │ │
//! │  │   mock · heuristics · remote inference (OpenAI-compat)   │ │
//! │  └──────────────────────────────────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Results only reach the history once an analysis has fully completed;
//! failures surface as typed [`VeracityError`]s and leave the history as is.

pub mod ai;
pub mod api;
pub mod config;
pub mod content;
pub mod detection;
pub mod engine;
pub mod history;
pub mod service;

// Re-exports for convenience
pub use config::VeracityConfig;
pub use content::{BinaryHandle, ContentKind, ContentSubmission, Payload};
pub use detection::{
    AnalysisContext, CancellationFlag, DetectionDetails, DetectionOutput, DetectionStrategy,
    RawScore,
};
pub use engine::registry::StrategyRegistry;
pub use engine::scoring::{AmbiguityBand, Assessment, ScoringPolicy, Verdict};
pub use engine::{AnalysisOrchestrator, AnalysisResult};
pub use history::{HistoryQuery, HistoryStats, HistoryStore};
pub use service::VerificationService;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VeracityError {
    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),

    #[error("No detection strategy registered for {0} content")]
    NoStrategyRegistered(ContentKind),

    #[error("Unsupported content for {strategy}: {reason}")]
    UnsupportedContent { strategy: String, reason: String },

    #[error("Strategy {strategy} unavailable: {reason}")]
    StrategyUnavailable { strategy: String, reason: String },

    #[error("Analysis by {strategy} timed out after {timeout_ms}ms")]
    AnalysisTimeout { strategy: String, timeout_ms: u64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Stable, closed error code exposed at the service boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidSubmission,
    NoStrategyRegistered,
    UnsupportedContent,
    StrategyUnavailable,
    AnalysisTimeout,
    Config,
    Io,
    Serialization,
}

impl VeracityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSubmission(_) => ErrorKind::InvalidSubmission,
            Self::NoStrategyRegistered(_) => ErrorKind::NoStrategyRegistered,
            Self::UnsupportedContent { .. } => ErrorKind::UnsupportedContent,
            Self::StrategyUnavailable { .. } => ErrorKind::StrategyUnavailable,
            Self::AnalysisTimeout { .. } => ErrorKind::AnalysisTimeout,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
            Self::SerdeError(_) => ErrorKind::Serialization,
        }
    }

    /// Whether resubmitting the same content may succeed later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::AnalysisTimeout { .. } | Self::StrategyUnavailable { .. }
        )
    }
}

pub type VeracityResult<T> = Result<T, VeracityError>;
