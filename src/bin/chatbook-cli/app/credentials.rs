use std::sync::Arc;

use chatbook::error::BookError;
use chatbook::prompt::{InputRequest, Prompter};
use chatbook::runner::{ChatCompletionsRunner, Runner, StaticCredentials};
use chatbook::secret_store::SecretStore;

use crate::config::AppConfig;

/// Build the runner from the secret store, falling back to the configured
/// environment variable and finally to asking for the key (which is then
/// stored for next time).
pub async fn build_runner<P>(config: &AppConfig, prompter: &P) -> anyhow::Result<Arc<dyn Runner>>
where
    P: Prompter + ?Sized,
{
    let runner_config = config.runner.to_runner_config();
    let mut store = SecretStore::new()?;
    match ChatCompletionsRunner::new(runner_config.clone(), &store) {
        Ok(runner) => return Ok(Arc::new(runner)),
        Err(BookError::MissingCredential(_)) => {}
        Err(err) => return Err(err.into()),
    }

    let key = runner_config.credential_key.clone();
    if let Ok(value) = std::env::var(&config.runner.api_key_env) {
        log::debug!("using API key from {}", config.runner.api_key_env);
        let credentials = StaticCredentials::new().with(key, value);
        return Ok(Arc::new(ChatCompletionsRunner::new(runner_config, &credentials)?));
    }

    let request = InputRequest::new(format!("API key for {}", config.runner.base_url));
    let Some(value) = prompter
        .input(&request)
        .await
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    else {
        anyhow::bail!("no API key available; run `chatbook key set <KEY>`");
    };
    store.set(&key, &value)?;
    println!("API key saved to {}", store.path().display());
    Ok(Arc::new(ChatCompletionsRunner::new(runner_config, &store)?))
}
