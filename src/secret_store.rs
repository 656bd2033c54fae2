use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::runner::CredentialSource;

/// Secrets kept in a JSON file, by default `~/.chatbook/secrets.json`.
///
/// Values are held as [`SecretString`] in memory and only exposed when
/// written back or handed to a runner.
#[derive(Debug)]
pub struct SecretStore {
    secrets: HashMap<String, SecretString>,
    file_path: PathBuf,
}

impl SecretStore {
    /// Opens the store at the default location, creating its directory.
    pub fn new() -> io::Result<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Could not find home directory")
        })?;
        Self::open(home_dir.join(".chatbook").join("secrets.json"))
    }

    /// Opens the store backed by `file_path`. A missing file is an empty store.
    pub fn open(file_path: impl Into<PathBuf>) -> io::Result<Self> {
        let file_path = file_path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut store = SecretStore {
            secrets: HashMap::new(),
            file_path,
        };
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn load(&mut self) -> io::Result<()> {
        let contents = match fs::read_to_string(&self.file_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        let secrets: HashMap<String, String> = serde_json::from_str(&contents)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;
        self.secrets = secrets
            .into_iter()
            .map(|(key, value)| (key, SecretString::new(value)))
            .collect();
        Ok(())
    }

    fn save(&self) -> io::Result<()> {
        let secrets: HashMap<&str, &str> = self
            .secrets
            .iter()
            .map(|(key, value)| (key.as_str(), value.expose_secret().as_str()))
            .collect();
        let contents = serde_json::to_string_pretty(&secrets)?;
        fs::write(&self.file_path, contents)?;
        restrict_permissions(&self.file_path)
    }

    pub fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.secrets
            .insert(key.to_string(), SecretString::new(value.to_string()));
        self.save()
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.secrets.get(key).map(|secret| secret.expose_secret())
    }

    pub fn delete(&mut self, key: &str) -> io::Result<()> {
        self.secrets.remove(key);
        self.save()
    }
}

impl CredentialSource for SecretStore {
    fn credential(&self, key: &str) -> Option<SecretString> {
        self.get(key).map(|value| SecretString::new(value.clone()))
    }
}

fn restrict_permissions(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
