use std::fs;

use super::error::ConfigError;
use super::load::{ensure_dirs, secure_file_permissions};
use super::paths::ConfigPaths;
use super::types::AppConfig;

const HEADER: &str = "\
# chatbook configuration
#
# [runner]     chat completions endpoint, default model and streaming
# [translate]  target language, instruction template ({language} is replaced)
# [storage]    root = directory for new documents (defaults to the data dir)
# [logging]    level, file path and rotation; RUST_LOG overrides the level
#
# The API key is not stored here: use `chatbook key set <KEY>` or the
# environment variable named by runner.api_key_env.

";

/// Render the config as commented TOML.
pub fn render_config(config: &AppConfig) -> Result<String, ConfigError> {
    Ok(format!("{HEADER}{}", toml::to_string_pretty(config)?))
}

/// Write the config through a sibling temp file so a failed write never
/// leaves a truncated config behind.
pub fn save_config(config: &AppConfig, paths: &ConfigPaths) -> Result<(), ConfigError> {
    ensure_dirs(paths)?;
    let contents = render_config(config)?;
    let staging = paths.config_file.with_extension("toml.tmp");
    fs::write(&staging, contents).map_err(ConfigError::write(&staging))?;
    secure_file_permissions(&staging)?;
    fs::rename(&staging, &paths.config_file).map_err(ConfigError::write(&paths.config_file))?;
    Ok(())
}
