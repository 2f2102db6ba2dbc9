//! Client-side report state: bounded input, one request in flight, and a
//! synchronous swap to either a result or an error on completion.

use std::future::Future;

use serde_json::Value;
use thiserror::Error;

use crate::report::ReportView;
use crate::schemas::EvaluateRequest;

/// Shown when a blank input is submitted
pub const BLANK_INPUT_MESSAGE: &str = "テキストを入力してください。";

/// Fallback when a failed request carries no usable message
pub const UNKNOWN_ERROR_MESSAGE: &str = "不明なエラーが発生しました。";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("a request is already in flight")]
    InFlight,

    #[error("input is blank")]
    Blank,
}

#[derive(Debug, Clone)]
pub struct ReportSession {
    input: String,
    max_chars: usize,
    loading: bool,
    result: Option<ReportView>,
    raw: Option<Value>,
    error: Option<String>,
}

impl ReportSession {
    pub fn new(max_chars: usize) -> Self {
        Self {
            input: String::new(),
            max_chars,
            loading: false,
            result: None,
            raw: None,
            error: None,
        }
    }

    /// Replace the input, truncated to the character bound. Ignored while loading.
    pub fn set_input(&mut self, text: &str) -> Result<(), SessionError> {
        if self.loading {
            return Err(SessionError::InFlight);
        }
        self.input = text.chars().take(self.max_chars).collect();
        Ok(())
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn can_submit(&self) -> bool {
        !self.loading && !self.input.trim().is_empty()
    }

    /// Enter the loading state and produce the request body.
    pub fn begin_submit(&mut self) -> Result<EvaluateRequest, SessionError> {
        if self.loading {
            return Err(SessionError::InFlight);
        }
        if self.input.trim().is_empty() {
            self.error = Some(BLANK_INPUT_MESSAGE.to_string());
            return Err(SessionError::Blank);
        }
        self.loading = true;
        self.error = None;
        self.result = None;
        self.raw = None;
        Ok(EvaluateRequest {
            input_text: self.input.clone(),
        })
    }

    /// Finish the in-flight request. Exactly one of result or error is set.
    pub fn complete(&mut self, outcome: Result<Value, String>) {
        self.loading = false;
        match outcome {
            Ok(value) => {
                self.result = Some(ReportView::from_value(&value));
                self.raw = Some(value);
                self.error = None;
            }
            Err(message) => {
                let message = if message.trim().is_empty() {
                    UNKNOWN_ERROR_MESSAGE.to_string()
                } else {
                    message
                };
                self.result = None;
                self.raw = None;
                self.error = Some(message);
            }
        }
    }

    /// Run one request through `send`, holding the session in the loading state.
    pub async fn submit<F, Fut>(&mut self, send: F) -> Result<(), SessionError>
    where
        F: FnOnce(EvaluateRequest) -> Fut,
        Fut: Future<Output = Result<Value, String>>,
    {
        let request = self.begin_submit()?;
        let outcome = send(request).await;
        self.complete(outcome);
        Ok(())
    }

    /// Back to a blank input with nothing shown.
    pub fn reset(&mut self) {
        self.input.clear();
        self.result = None;
        self.raw = None;
        self.error = None;
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn result(&self) -> Option<&ReportView> {
        self.result.as_ref()
    }

    /// The object exactly as the server returned it
    pub fn raw(&self) -> Option<&Value> {
        self.raw.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
