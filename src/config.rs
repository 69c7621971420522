use std::time::Duration;

use thiserror::Error;
use url::Url;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 5000;
const MONGODB_URI: &str = "mongodb://localhost:27017/";
const MONGODB_DATABASE: &str = "globetrotter";
const MODEL_BASE_URL: &str = "https://api.groq.com/openai/v1";
const MODEL_NAME: &str = "llama-3.3-70b-versatile";
const MODEL_TEMPERATURE: f32 = 0.7;
const MODEL_MAX_TOKENS: u32 = 4096;
const MODEL_TIMEOUT_SECS: u64 = 60;
const SHARE_BASE_URL: &str = "https://globetrotter.com/shared";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} has an invalid value '{value}': {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    Mongo { uri: String, database: String },
    Memory,
}

impl StoreBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StoreBackend::Mongo { .. } => "mongo",
            StoreBackend::Memory => "memory",
        }
    }
}

/// Parameters controlling the model's output randomness and length.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl SamplingConfig {
    pub fn new(model: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            temperature,
            max_tokens,
        }
    }

    /// Same model and temperature with a lower token ceiling.
    pub fn capped(&self, max_tokens: u32) -> Self {
        Self {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens.min(max_tokens),
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self::new(MODEL_NAME, MODEL_TEMPERATURE, MODEL_MAX_TOKENS)
    }
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub sampling: SamplingConfig,
    pub timeout: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: MODEL_BASE_URL.to_string(),
            sampling: SamplingConfig::default(),
            timeout: Duration::from_secs(MODEL_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    pub model: ModelConfig,
    pub share_base_url: Url,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests need not touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let host = get("HOST").unwrap_or_else(|| HOST.to_string());
        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid("PORT", &raw, e.to_string()))?,
            None => PORT,
        };

        let store = match get("STORE_BACKEND").as_deref().map(str::trim) {
            None | Some("mongo") => StoreBackend::Mongo {
                uri: get("MONGODB_URI").unwrap_or_else(|| MONGODB_URI.to_string()),
                database: get("MONGODB_DATABASE").unwrap_or_else(|| MONGODB_DATABASE.to_string()),
            },
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::invalid(
                    "STORE_BACKEND",
                    other,
                    "expected 'mongo' or 'memory'",
                ))
            }
        };

        let base_url = get("MODEL_BASE_URL").unwrap_or_else(|| MODEL_BASE_URL.to_string());
        Url::parse(&base_url)
            .map_err(|e| ConfigError::invalid("MODEL_BASE_URL", &base_url, e.to_string()))?;

        let temperature = match get("MODEL_TEMPERATURE") {
            Some(raw) => {
                let value = raw
                    .trim()
                    .parse::<f32>()
                    .map_err(|e| ConfigError::invalid("MODEL_TEMPERATURE", &raw, e.to_string()))?;
                if !(0.0..=1.0).contains(&value) {
                    return Err(ConfigError::invalid(
                        "MODEL_TEMPERATURE",
                        &raw,
                        "must be between 0.0 and 1.0",
                    ));
                }
                value
            }
            None => MODEL_TEMPERATURE,
        };

        let max_tokens = match get("MODEL_MAX_TOKENS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(value) if value > 0 => value,
                Ok(_) => {
                    return Err(ConfigError::invalid(
                        "MODEL_MAX_TOKENS",
                        &raw,
                        "must be a positive integer",
                    ))
                }
                Err(e) => return Err(ConfigError::invalid("MODEL_MAX_TOKENS", &raw, e.to_string())),
            },
            None => MODEL_MAX_TOKENS,
        };

        let timeout_secs = match get("MODEL_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(value) if value > 0 => value,
                Ok(_) => {
                    return Err(ConfigError::invalid(
                        "MODEL_TIMEOUT_SECS",
                        &raw,
                        "must be a positive integer",
                    ))
                }
                Err(e) => {
                    return Err(ConfigError::invalid("MODEL_TIMEOUT_SECS", &raw, e.to_string()))
                }
            },
            None => MODEL_TIMEOUT_SECS,
        };

        let model = ModelConfig {
            api_key: get("GROQ_API_KEY").map(|key| key.trim().to_string()),
            base_url,
            sampling: SamplingConfig::new(
                get("MODEL_NAME").unwrap_or_else(|| MODEL_NAME.to_string()),
                temperature,
                max_tokens,
            ),
            timeout: Duration::from_secs(timeout_secs),
        };

        // Trailing slash so Url::join appends the trip id instead of replacing
        // the last segment.
        let mut share_raw = get("SHARE_BASE_URL").unwrap_or_else(|| SHARE_BASE_URL.to_string());
        if !share_raw.ends_with('/') {
            share_raw.push('/');
        }
        let share_base_url = Url::parse(&share_raw)
            .map_err(|e| ConfigError::invalid("SHARE_BASE_URL", &share_raw, e.to_string()))?;

        Ok(Self {
            host,
            port,
            store,
            model,
            share_base_url,
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
