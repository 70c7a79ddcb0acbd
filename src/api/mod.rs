//! Service boundary: wire DTOs and JSON handlers
//!
//! Field names are camelCase on the wire; `kind` and `verdict` travel as
//! lower-case strings. Errors become an [`ErrorBody`] carrying a stable
//! code and whether retrying can help. Transport (HTTP server, routing) is
//! left to the embedding application; the handlers here take and return
//! JSON text plus a status code.

pub mod json;

use crate::content::{BinaryHandle, ContentKind, ContentSubmission, Payload};
use crate::engine::scoring::Verdict;
use crate::history::HistoryQuery;
use crate::service::VerificationService;
use crate::{ErrorKind, VeracityError, VeracityResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Requests ──────────────────────────────────────────────────────

/// Body of a submit call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubmitRequest {
    pub kind: ContentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_payload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_handle: Option<BinaryHandle>,
    /// Defaults to the time the request is converted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl SubmitRequest {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Text,
            text_payload: Some(text.into()),
            binary_handle: None,
            submitted_at: None,
        }
    }

    pub fn binary(kind: ContentKind, handle: BinaryHandle) -> Self {
        Self {
            kind,
            text_payload: None,
            binary_handle: Some(handle),
            submitted_at: None,
        }
    }

    /// Exactly one payload, consistent with `kind`
    pub fn into_submission(self) -> VeracityResult<ContentSubmission> {
        let payload = match (self.text_payload, self.binary_handle) {
            (Some(text), None) => Payload::Text(text),
            (None, Some(handle)) => Payload::Binary(handle),
            (Some(_), Some(_)) => {
                return Err(VeracityError::InvalidSubmission(
                    "provide either textPayload or binaryHandle, not both".into(),
                ))
            }
            (None, None) => {
                return Err(VeracityError::InvalidSubmission(
                    "missing textPayload or binaryHandle".into(),
                ))
            }
        };
        let submission = ContentSubmission::at(
            self.kind,
            payload,
            self.submitted_at.unwrap_or_else(Utc::now),
        );
        submission.validate()?;
        Ok(submission)
    }
}

/// Body of a history call; every field optional
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryRequest {
    pub limit: Option<usize>,
    pub kind_filter: Option<ContentKind>,
    pub verdict_filter: Option<Verdict>,
}

impl From<HistoryRequest> for HistoryQuery {
    fn from(req: HistoryRequest) -> Self {
        HistoryQuery {
            limit: req.limit,
            kind: req.kind_filter,
            verdict: req.verdict_filter,
        }
    }
}

// ─── Errors ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl From<&VeracityError> for ErrorBody {
    fn from(e: &VeracityError) -> Self {
        Self {
            error: e.kind(),
            message: e.to_string(),
            retryable: e.is_retryable(),
        }
    }
}

/// HTTP-style status code for an error kind
pub fn status_for(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::InvalidSubmission | ErrorKind::Serialization => 400,
        ErrorKind::NoStrategyRegistered | ErrorKind::UnsupportedContent => 422,
        ErrorKind::StrategyUnavailable => 503,
        ErrorKind::AnalysisTimeout => 504,
        ErrorKind::Config | ErrorKind::Io => 500,
    }
}

// ─── Handlers ──────────────────────────────────────────────────────

/// Status code and JSON body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    fn ok(rendered: VeracityResult<String>) -> Self {
        match rendered {
            Ok(body) => Self { status: 200, body },
            Err(e) => Self::error(&e),
        }
    }

    fn error(e: &VeracityError) -> Self {
        let body = ErrorBody::from(e);
        let status = status_for(body.error);
        match json::render_error(&body) {
            Ok(body) => Self { status, body },
            Err(_) => Self {
                status: 500,
                body: r#"{"error":"Serialization","message":"failed to render error","retryable":false}"#.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// `submit`: JSON [`SubmitRequest`] in, JSON result or [`ErrorBody`] out
pub async fn handle_submit(service: &VerificationService, body: &str) -> ApiResponse {
    let request: SubmitRequest = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => {
            return ApiResponse::error(&VeracityError::InvalidSubmission(format!(
                "malformed request: {}",
                e
            )))
        }
    };

    let outcome = match request.into_submission() {
        Ok(submission) => service.submit(submission).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(result) => ApiResponse::ok(json::render_result(&result)),
        Err(e) => ApiResponse::error(&e),
    }
}

/// `history`: optional JSON [`HistoryRequest`]; a blank body lists everything
pub async fn handle_history(service: &VerificationService, body: &str) -> ApiResponse {
    let request: HistoryRequest = if body.trim().is_empty() {
        HistoryRequest::default()
    } else {
        match serde_json::from_str(body) {
            Ok(r) => r,
            Err(e) => return ApiResponse::error(&VeracityError::SerdeError(e)),
        }
    };
    let results = service.history(&request.into()).await;
    ApiResponse::ok(json::render_history(&results))
}

/// `stats`: `{total, realCount, fakeCount, uncertainCount}`
pub async fn handle_stats(service: &VerificationService) -> ApiResponse {
    ApiResponse::ok(json::render_stats(&service.stats().await))
}
