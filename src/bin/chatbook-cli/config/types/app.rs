use serde::{Deserialize, Serialize};

use super::{LoggingConfig, RunnerConfig, StorageConfig, TranslateConfig};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub runner: RunnerConfig,
    pub translate: TranslateConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}
