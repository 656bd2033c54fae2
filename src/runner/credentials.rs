use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};

/// Key under which the model endpoint credential is stored.
pub const CREDENTIAL_KEY: &str = "openai_api_key";

/// Where a runner obtains its credential at construction time.
pub trait CredentialSource: Send + Sync {
    fn credential(&self, key: &str) -> Option<SecretString>;
}

/// Fixed in-memory credentials, e.g. taken from the environment.
#[derive(Debug, Default)]
pub struct StaticCredentials {
    values: HashMap<String, SecretString>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values
            .insert(key.into(), SecretString::new(value.into()));
        self
    }
}

impl CredentialSource for StaticCredentials {
    fn credential(&self, key: &str) -> Option<SecretString> {
        self.values
            .get(key)
            .map(|secret| SecretString::new(secret.expose_secret().clone()))
    }
}
