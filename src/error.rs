//! Domain-specific error types for irradiate-council

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::validation::ValidationIssue;

/// Message shown to the user when the input text is missing or blank.
pub const EMPTY_INPUT_MESSAGE: &str = "テキストが入力されていません。";

/// Generic message for every server-side failure. Causes are only logged.
pub const GENERIC_FAILURE_MESSAGE: &str = "AIとの通信中にサーバー内部でエラーが発生しました。";

/// Main error type for the evaluation pipeline
#[derive(Error, Debug)]
pub enum CouncilError {
    #[error("input text is empty")]
    EmptyInput,

    #[error("input text has {chars} characters, limit is {max}")]
    InputTooLong { chars: usize, max: usize },

    #[error("request body exceeds the size limit (text limit is {max} characters)")]
    BodyTooLarge { max: usize },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Upstream model error: {message}")]
    Upstream { message: String },

    #[error("Upstream model returned HTTP {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Timeout error: {operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("no JSON object found in model output")]
    NoJsonFound,

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("model output failed validation with {} issue(s)", issues.len())]
    Incomplete { issues: Vec<ValidationIssue> },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CouncilError {
    pub fn status(&self) -> StatusCode {
        match self {
            CouncilError::EmptyInput
            | CouncilError::InputTooLong { .. }
            | CouncilError::BodyTooLarge { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text safe to show to the end user.
    pub fn user_message(&self) -> String {
        match self {
            CouncilError::EmptyInput => EMPTY_INPUT_MESSAGE.to_string(),
            CouncilError::InputTooLong { max, .. } | CouncilError::BodyTooLarge { max } => {
                format!("テキストは{max}文字以内で入力してください。")
            }
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<anyhow::Error> for CouncilError {
    fn from(err: anyhow::Error) -> Self {
        CouncilError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CouncilError {
    fn from(err: serde_json::Error) -> Self {
        CouncilError::Parse {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for CouncilError {
    fn from(err: reqwest::Error) -> Self {
        CouncilError::Upstream {
            message: format!("HTTP request failed: {}", err),
        }
    }
}

/// Convert CouncilError to the `{ "error": ... }` wire shape
impl IntoResponse for CouncilError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "evaluation failed");
        }
        let mut body = json!({ "error": self.user_message() });
        if let CouncilError::Incomplete { issues } = &self {
            body["issues"] = json!(issues);
        }
        (status, Json(body)).into_response()
    }
}

/// Result type alias for council operations
pub type Result<T> = std::result::Result<T, CouncilError>;
