//! JSON renderers for the service boundary

use super::ErrorBody;
use crate::engine::AnalysisResult;
use crate::history::HistoryStats;
use crate::VeracityResult;

/// Render one result as pretty-printed JSON
pub fn render_result(result: &AnalysisResult) -> VeracityResult<String> {
    serde_json::to_string_pretty(result).map_err(crate::VeracityError::SerdeError)
}

/// Render a history listing, newest first as given
pub fn render_history(results: &[AnalysisResult]) -> VeracityResult<String> {
    serde_json::to_string_pretty(results).map_err(crate::VeracityError::SerdeError)
}

pub fn render_stats(stats: &HistoryStats) -> VeracityResult<String> {
    serde_json::to_string_pretty(stats).map_err(crate::VeracityError::SerdeError)
}

pub fn render_error(error: &ErrorBody) -> VeracityResult<String> {
    serde_json::to_string_pretty(error).map_err(crate::VeracityError::SerdeError)
}
