//! The evaluation pipeline: input checks, sanitization, prompt construction,
//! one upstream call, JSON extraction and schema validation.

use std::sync::Arc;

use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::clients::GenerativeModel;
use crate::config::{CouncilPolicy, EvaluationConfig};
use crate::error::{CouncilError, Result};
use crate::extract::extract_json_object;
use crate::prompts::{EVALUATION_PROMPT, build_prompt};
use crate::sanitize::sanitize_input;
use crate::schemas::{AnalysisResult, Axis};
use crate::validation::{ValidationReport, validate_report};

/// Outcome of one successful evaluation
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Correlates the response with the `evaluate` log span
    pub id: Uuid,
    /// The parsed object exactly as the model produced it
    pub raw: Value,
    pub report: ValidationReport,
}

#[derive(Clone)]
pub struct Evaluator {
    model: Arc<dyn GenerativeModel>,
    settings: EvaluationConfig,
}

impl Evaluator {
    pub fn new(model: Arc<dyn GenerativeModel>, settings: EvaluationConfig) -> Self {
        Self { model, settings }
    }

    pub fn settings(&self) -> &EvaluationConfig {
        &self.settings
    }

    /// Reject blank or oversized input before anything else happens.
    pub fn check_input(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(CouncilError::EmptyInput);
        }
        let chars = text.chars().count();
        if chars > self.settings.max_chars {
            return Err(CouncilError::InputTooLong {
                chars,
                max: self.settings.max_chars,
            });
        }
        Ok(())
    }

    pub async fn evaluate(&self, input: &str) -> Result<Evaluation> {
        let id = Uuid::new_v4();
        let span = tracing::info_span!("evaluate", %id, model = self.model.model_name());
        self.run(id, input).instrument(span).await
    }

    async fn run(&self, id: Uuid, input: &str) -> Result<Evaluation> {
        self.check_input(input)?;

        let sanitized = sanitize_input(input);
        let prompt = build_prompt(&sanitized);
        tracing::info!(
            prompt_id = EVALUATION_PROMPT.id,
            prompt_version = EVALUATION_PROMPT.version,
            prompt_sha1 = %EVALUATION_PROMPT.checksum,
            input_chars = input.chars().count(),
            "sending evaluation request"
        );

        let response = self.model.generate(&prompt).await?;
        let raw = extract_json_object(&response.text)?;

        let report = validate_report(&raw);
        if !report.is_clean() {
            if report.has_council_count_issue() {
                tracing::warn!("model did not return a complete council");
            }
            for issue in &report.issues {
                tracing::warn!(%issue, "model output issue");
            }
            if self.settings.policy == CouncilPolicy::Reject {
                return Err(CouncilError::Incomplete {
                    issues: report.issues,
                });
            }
        }

        let typed = if report.is_clean() {
            match serde_json::from_value::<AnalysisResult>(raw.clone()) {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::warn!("validated output did not deserialize: {}", e);
                    None
                }
            }
        } else {
            None
        };

        if let Some(result) = &typed {
            let axes: Vec<String> = Axis::ALL
                .iter()
                .map(|a| format!("{}={}", a.key(), result.axes.get(*a)))
                .collect();
            tracing::info!(
                overall = result.overall_score,
                axes = %axes.join(","),
                "evaluation complete"
            );
        } else {
            tracing::info!(issues = report.issues.len(), "evaluation complete with issues");
        }

        Ok(Evaluation { id, raw, report })
    }
}
