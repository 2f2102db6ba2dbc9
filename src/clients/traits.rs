use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::CouncilError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Raw text output; expected to contain one JSON object
    pub text: String,
    pub model: String,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("http error: {0}")]
    Http(String),
    #[error("model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("parse error: {0}")]
    ParseError(String),
    #[error("prompt blocked: {0}")]
    Blocked(String),
    #[error("model returned no text")]
    Empty,
}

impl From<ModelError> for CouncilError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Timeout { timeout_ms } => CouncilError::Timeout {
                operation: "generateContent".to_string(),
                timeout_ms,
            },
            ModelError::Status { status, body } => CouncilError::UpstreamStatus { status, body },
            other => CouncilError::Upstream {
                message: other.to_string(),
            },
        }
    }
}

/// A text-generation backend. One call per evaluation, no retries.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<ModelResponse, ModelError>;

    fn model_name(&self) -> &str;
}
