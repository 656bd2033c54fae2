use std::path::PathBuf;

use super::error::ConfigError;

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_file: PathBuf,
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub logs_dir: PathBuf,
}

impl ConfigPaths {
    pub fn resolve(config_override: Option<PathBuf>) -> Result<Self, ConfigError> {
        let data_dir = default_data_dir()?;
        let logs_dir = data_dir.join("logs");
        let (config_dir, config_file) = match config_override {
            Some(path) => {
                let dir = match path.parent() {
                    Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
                    Some(parent) => parent.to_path_buf(),
                    None => return Err(ConfigError::NoParent(path)),
                };
                (dir, path)
            }
            None => {
                let dir = default_config_dir()?;
                let file = dir.join("config.toml");
                (dir, file)
            }
        };
        Ok(Self {
            config_file,
            config_dir,
            data_dir,
            logs_dir,
        })
    }

    /// Where new documents go when `[storage] root` is not set.
    pub fn documents_dir(&self) -> PathBuf {
        self.data_dir.join("documents")
    }
}

fn default_config_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::MissingHome)?;
    Ok(home.join(".config").join("chatbook"))
}

fn default_data_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::MissingHome)?;
    Ok(home.join(".local").join("share").join("chatbook"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_uses_its_parent_directory() {
        let paths = ConfigPaths::resolve(Some(PathBuf::from("/etc/chatbook/alt.toml"))).expect("resolve");
        assert_eq!(paths.config_dir, PathBuf::from("/etc/chatbook"));
        assert_eq!(paths.config_file, PathBuf::from("/etc/chatbook/alt.toml"));

        let bare = ConfigPaths::resolve(Some(PathBuf::from("alt.toml"))).expect("resolve");
        assert_eq!(bare.config_dir, PathBuf::from("."));
    }

    #[test]
    fn root_override_has_no_parent() {
        let err = ConfigPaths::resolve(Some(PathBuf::from("/"))).expect_err("root");
        assert!(matches!(err, ConfigError::NoParent(_)));
    }
}
