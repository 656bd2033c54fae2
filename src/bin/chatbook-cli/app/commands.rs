use chatbook::runner::CREDENTIAL_KEY;
use chatbook::secret_store::SecretStore;
use chatbook::serializer;

use crate::args::KeyAction;
use crate::config::{save_config, AppConfig, LoadedConfig};

pub fn init(loaded: &LoadedConfig) -> anyhow::Result<()> {
    if loaded.config_exists {
        println!("Config already exists at {}", loaded.paths.config_file.display());
        return Ok(());
    }
    save_config(&AppConfig::default(), &loaded.paths)?;
    println!("Wrote default config to {}", loaded.paths.config_file.display());
    Ok(())
}

pub fn handle_key(action: &KeyAction, config: &AppConfig) -> anyhow::Result<()> {
    let mut store = SecretStore::new()?;
    let key = if config.runner.credential_key.is_empty() {
        CREDENTIAL_KEY
    } else {
        config.runner.credential_key.as_str()
    };
    match action {
        KeyAction::Set { value } => {
            store.set(key, value)?;
            println!("Secret '{key}' has been set.");
        }
        KeyAction::Get => match store.get(key) {
            Some(value) => println!("{key}: {}", mask(value)),
            None => println!("Secret '{key}' not found"),
        },
        KeyAction::Delete => {
            store.delete(key)?;
            println!("Secret '{key}' deleted.");
        }
    }
    Ok(())
}

pub async fn show(file: &std::path::Path) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(file).await?;
    let document = serializer::decode(&bytes);
    for (i, message) in document.messages.iter().enumerate() {
        println!("#{i} [{}]\n{}\n", message.role, message.content);
    }
    if !document.parameters.is_empty() {
        println!(
            "parameters: {}",
            serde_json::to_string_pretty(&document.parameters)?
        );
    }
    Ok(())
}

/// Show only the last four characters of a secret.
fn mask(value: &str) -> String {
    let visible: String = value
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{visible}")
}
