mod commands;
mod credentials;
mod documents;
mod echo;
mod prompter;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use crate::args::{CliArgs, Command};
use crate::config::load_config;
use crate::logging::init_logging;

use documents::Session;
use prompter::TerminalPrompter;

pub async fn run() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let loaded = load_config(args.config.clone())?;
    let _logger = init_logging(&loaded.config.logging, &loaded.paths)?;

    match &args.command {
        Command::Init => return commands::init(&loaded),
        Command::Key { action } => return commands::handle_key(action, &loaded.config),
        Command::Show { file } => return commands::show(file).await,
        _ => {}
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    let session = Session {
        loaded,
        prompter: TerminalPrompter::new(cancel.clone()),
        cancel,
    };
    match args.command {
        Command::New {
            identity,
            language,
            content,
            input,
        } => documents::new_document(&session, &identity, language, content, input.as_deref()).await,
        Command::Translate {
            file,
            language,
            split,
        } => documents::translate(&session, &file, language, split).await,
        Command::Run { file, cell } => documents::run_cell(&session, &file, cell).await,
        Command::Params { file } => documents::edit_params(&session, &file).await,
        Command::Init | Command::Key { .. } | Command::Show { .. } => Ok(()),
    }
}
