use serde::{Deserialize, Serialize};

use chatbook::driver::DriverConfig;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslateConfig {
    pub default_language: String,
    /// System instruction; `{language}` is replaced by the target language
    pub instruction: String,
    pub extension: String,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        let defaults = DriverConfig::default();
        Self {
            default_language: defaults.default_language,
            instruction: defaults.instruction_template,
            extension: defaults.extension,
        }
    }
}
