use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::clients::traits::{GenerativeModel, ModelError, ModelResponse};
use crate::config::{Config, GeminiConfig};
use crate::error::CouncilError;

const JSON_MIME_TYPE: &str = "application/json";
const BODY_CAP_BYTES: usize = 2 * 1024;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Client for the Gemini `generateContent` REST endpoint
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    timeout_ms: u64,
}

impl GeminiClient {
    pub fn new(cfg: &GeminiConfig, api_key: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build reqwest client with timeout: {}", e))?;
        Ok(Self {
            client,
            api_key,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            timeout_ms: cfg.timeout_ms,
        })
    }

    /// Build from loaded configuration; fails when no API key is set
    pub fn from_config(config: &Config) -> Result<Self, CouncilError> {
        let api_key = config
            .runtime
            .gemini_api_key
            .clone()
            .ok_or_else(|| CouncilError::Config {
                message: "GEMINI_API_KEY is not set".to_string(),
            })?;
        Ok(Self::new(&config.gemini, api_key)?)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<ModelResponse, ModelError> {
        tracing::debug!(
            "Calling Gemini (model={}, prompt_chars={})",
            self.model,
            prompt.chars().count()
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: JSON_MIME_TYPE,
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout {
                        timeout_ms: self.timeout_ms,
                    }
                } else {
                    ModelError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let mut text = response.text().await.unwrap_or_default();
            if text.len() > BODY_CAP_BYTES {
                let mut cut = BODY_CAP_BYTES;
                while !text.is_char_boundary(cut) {
                    cut -= 1;
                }
                text.truncate(cut);
            }
            return Err(ModelError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ModelError::Timeout {
                    timeout_ms: self.timeout_ms,
                }
            } else {
                ModelError::ParseError(e.to_string())
            }
        })?;

        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Err(ModelError::Blocked(reason));
        }

        let candidate = parsed.candidates.into_iter().next().ok_or(ModelError::Empty)?;
        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(ModelError::Empty);
        }

        tracing::debug!(
            "Gemini answered (chars={}, finish_reason={:?})",
            text.chars().count(),
            candidate.finish_reason
        );

        Ok(ModelResponse {
            text,
            model: parsed.model_version.unwrap_or_else(|| self.model.clone()),
            finish_reason: candidate.finish_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_shape() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: "hello" }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: JSON_MIME_TYPE,
                temperature: 0.8,
            },
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["contents"][0]["role"], "user");
        assert_eq!(v["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(v["generationConfig"]["responseMimeType"], "application/json");
        assert!((v["generationConfig"]["temperature"].as_f64().unwrap() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn response_parts_parse() {
        let parsed: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "{\"a\"" }, { "text": ": 1}" }] },
                "finishReason": "STOP"
            }],
            "modelVersion": "gemini-1.5-flash-002"
        }))
        .unwrap();
        let candidate = &parsed.candidates[0];
        assert_eq!(candidate.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(candidate.content.as_ref().unwrap().parts.len(), 2);
        assert!(parsed.prompt_feedback.is_none());
    }

    #[test]
    fn missing_key_is_config_error() {
        let config = Config::default();
        assert!(matches!(
            GeminiClient::from_config(&config),
            Err(CouncilError::Config { .. })
        ));
    }

    #[test]
    fn endpoint_uses_model_path() {
        let mut cfg = GeminiConfig::default();
        cfg.base_url = "http://localhost:9999/".into();
        let client = GeminiClient::new(&cfg, "k".into()).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(client.model_name(), "gemini-1.5-flash");
    }
}
