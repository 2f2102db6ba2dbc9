use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_MAX_CHARS: usize = 7000;

/// Main configuration structure loaded from council.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub server: ServerConfig,
    pub evaluation: EvaluationConfig,
    /// Secrets and logging, loaded from environment variables only
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Upstream generative model settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_ms: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            temperature: 0.8,
            timeout_ms: 120_000,
        }
    }
}

/// HTTP front-end settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub http_bind: std::net::SocketAddr,
    /// Whole-request budget; should exceed `gemini.timeout_ms`
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_bind: std::net::SocketAddr::from(([127, 0, 0, 1], 3000)),
            request_timeout_ms: 150_000,
        }
    }
}

/// Input bounds and the completeness policy for model output
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub max_chars: usize,
    pub policy: CouncilPolicy,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            policy: CouncilPolicy::Warn,
        }
    }
}

/// What to do when the model output does not satisfy the report schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CouncilPolicy {
    /// Log every issue and pass the object through unchanged
    #[default]
    Warn,
    /// Fail the request with the list of issues
    Reject,
}

impl FromStr for CouncilPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warn" | "log" => Ok(CouncilPolicy::Warn),
            "reject" | "strict" => Ok(CouncilPolicy::Reject),
            other => Err(anyhow::anyhow!(
                "unknown council policy '{}', expected 'warn' or 'reject'",
                other
            )),
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub gemini_api_key: Option<String>,
    /// Shared secret for the login gate; `None` disables the gate
    pub login_password: Option<String>,
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            login_password: None,
            log_level: "irradiate_council=info,tower_http=info".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env() -> Self {
        Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            login_password: std::env::var("LOGIN_PASSWORD")
                .ok()
                .filter(|v| !v.is_empty()),
            log_level: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "irradiate_council=info,tower_http=info".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses COUNCIL_CONFIG environment variable or defaults to "council.toml"
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(env_path) = std::env::var("COUNCIL_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
        }

        let config_path =
            std::env::var("COUNCIL_CONFIG").unwrap_or_else(|_| "council.toml".to_string());

        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(_) => {
                tracing::debug!("Config file {} not found, using defaults", config_path);
                Self::default()
            }
        };

        config.apply_env_overrides()?;
        config.runtime = RuntimeConfig::load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Env-first overrides for the file-backed sections
    fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(url) = std::env::var("GEMINI_BASE_URL") {
            self.gemini.base_url = url;
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Some(t) = std::env::var("GEMINI_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse::<f32>().ok())
        {
            self.gemini.temperature = t;
        }
        if let Some(ms) = std::env::var("GEMINI_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.gemini.timeout_ms = ms;
        }
        if let Ok(v) = std::env::var("COUNCIL_HTTP_BIND")
            && let Ok(bind) = v.parse::<std::net::SocketAddr>()
        {
            self.server.http_bind = bind;
        }
        if let Some(ms) = std::env::var("COUNCIL_HTTP_REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.server.request_timeout_ms = ms;
        }
        if let Some(max) = std::env::var("COUNCIL_MAX_CHARS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
        {
            self.evaluation.max_chars = max;
        }
        if let Ok(policy) = std::env::var("COUNCIL_POLICY") {
            self.evaluation.policy = policy.parse()?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=2.0).contains(&self.gemini.temperature) {
            anyhow::bail!("GEMINI_TEMPERATURE must be between 0.0 and 2.0");
        }
        if self.evaluation.max_chars == 0 {
            anyhow::bail!("COUNCIL_MAX_CHARS must be > 0");
        }
        if !self.gemini.base_url.starts_with("http://")
            && !self.gemini.base_url.starts_with("https://")
        {
            anyhow::bail!(
                "GEMINI_BASE_URL '{}' must start with http:// or https://",
                self.gemini.base_url
            );
        }
        if self.server.request_timeout_ms <= self.gemini.timeout_ms {
            tracing::warn!(
                "request timeout {}ms does not exceed the Gemini timeout {}ms; slow answers will surface as request timeouts",
                self.server.request_timeout_ms,
                self.gemini.timeout_ms
            );
        }
        Ok(())
    }
}
