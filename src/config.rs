//! Worker configuration.
//!
//! Credentials and model selection are read once at startup and threaded
//! explicitly into the components that need them; library code never reads
//! the environment on its own.

use std::str::FromStr;

use crate::error::{AsmDocError, Result};
use crate::llm::LlmBackend;

/// Upper bound on response rounds per completion call when none is
/// configured.
const DEFAULT_MAX_ROUNDS: usize = 3;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: LlmBackend,
    pub api_key: String,
    /// Model override; each provider has its own default.
    pub model: Option<String>,
    /// Upper bound on response rounds per completion call.
    pub max_rounds: usize,
}

impl AppConfig {
    /// Reads `ASMDOC_BACKEND` (anthropic/claude/openai/gpt), the selected
    /// provider's API key and model variables, and `ASMDOC_MAX_ROUNDS`.
    pub fn from_env() -> Result<Self> {
        let backend = match std::env::var("ASMDOC_BACKEND") {
            Ok(value) => LlmBackend::from_str(&value)
                .map_err(|e| AsmDocError::Configuration(e.to_string()))?,
            Err(_) => LlmBackend::default(),
        };

        let (key_var, model_var) = match backend {
            LlmBackend::Anthropic => ("ANTHROPIC_API_KEY", "ANTHROPIC_MODEL"),
            LlmBackend::OpenAi => ("OPENAI_API_KEY", "OPENAI_MODEL"),
        };

        let api_key = std::env::var(key_var).map_err(|_| {
            AsmDocError::Configuration(format!("{key_var} environment variable not set"))
        })?;
        let model = std::env::var(model_var).ok();

        let max_rounds = match std::env::var("ASMDOC_MAX_ROUNDS") {
            Ok(value) => value.parse().map_err(|_| {
                AsmDocError::Configuration(format!("invalid ASMDOC_MAX_ROUNDS value '{value}'"))
            })?,
            Err(_) => DEFAULT_MAX_ROUNDS,
        };

        Ok(Self {
            backend,
            api_key,
            model,
            max_rounds,
        })
    }
}
