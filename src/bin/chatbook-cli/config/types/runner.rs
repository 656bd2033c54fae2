use serde::{Deserialize, Serialize};

use chatbook::runner::{ChatCompletionsConfig, CREDENTIAL_KEY};

/// The chat completions endpoint used to run turns.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub base_url: String,
    pub model: String,
    pub stream: bool,
    pub timeout_seconds: Option<u64>,
    /// Secret store key holding the API key
    pub credential_key: String,
    /// Environment variable consulted when the secret store has no key
    pub api_key_env: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        let defaults = ChatCompletionsConfig::default();
        Self {
            base_url: defaults.base_url,
            model: defaults.model,
            stream: defaults.stream,
            timeout_seconds: defaults.timeout_seconds,
            credential_key: CREDENTIAL_KEY.to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl RunnerConfig {
    pub fn to_runner_config(&self) -> ChatCompletionsConfig {
        ChatCompletionsConfig {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            stream: self.stream,
            timeout_seconds: self.timeout_seconds,
            credential_key: self.credential_key.clone(),
        }
    }
}
