use std::path::{Path, PathBuf};

use chatbook::driver::{persist, ChunkMode, DocumentRequest, DriverConfig, GenerationDriver};
use chatbook::notebook::{MemoryNotebook, Notebook};
use chatbook::parameters::ParameterStore;
use chatbook::serializer;
use tokio_util::sync::CancellationToken;

use crate::config::LoadedConfig;

use super::credentials::build_runner;
use super::echo::EchoNotebook;
use super::prompter::TerminalPrompter;

/// Everything a document command needs.
pub struct Session {
    pub loaded: LoadedConfig,
    pub prompter: TerminalPrompter,
    pub cancel: CancellationToken,
}

impl Session {
    fn driver_config(&self) -> DriverConfig {
        let config = &self.loaded.config;
        let root = config
            .storage
            .root
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.loaded.paths.documents_dir());
        DriverConfig {
            instruction_template: config.translate.instruction.clone(),
            default_language: config.translate.default_language.clone(),
            extension: config.translate.extension.clone(),
            storage_root: Some(root),
        }
    }

    async fn driver(&self) -> anyhow::Result<GenerationDriver> {
        let runner = build_runner(&self.loaded.config, &self.prompter).await?;
        Ok(GenerationDriver::new(runner, self.driver_config()))
    }
}

pub async fn new_document(
    session: &Session,
    identity: &str,
    language: Option<String>,
    content: Option<String>,
    input: Option<&Path>,
) -> anyhow::Result<()> {
    let content = match (content, input) {
        (Some(content), _) => Some(content),
        (None, Some(path)) => Some(tokio::fs::read_to_string(path).await?),
        (None, None) => None,
    };
    let request = DocumentRequest {
        identity: Some(identity.to_string()),
        content,
        language,
    };
    let driver = GenerationDriver::without_runner(session.driver_config());
    let created = driver.create(&request, &session.prompter).await?;
    println!("{}", created.path.display());
    Ok(())
}

pub async fn translate(
    session: &Session,
    file: &Path,
    language: Option<String>,
    split: ChunkMode,
) -> anyhow::Result<()> {
    let identity = file
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string);
    let content = tokio::fs::read_to_string(file).await?;
    let request = DocumentRequest {
        identity,
        content: Some(content),
        language,
    };
    let driver = session.driver().await?;
    let mut notebook = EchoNotebook::new(MemoryNotebook::new());
    let outcome = driver
        .translate(&request, split, &mut notebook, &session.prompter, &session.cancel)
        .await?;
    notebook.finish();

    println!("{}", outcome.path.display());
    if !outcome.report.failed.is_empty() {
        eprintln!(
            "{} turn(s) failed (cells {:?}); rerun them with `chatbook run --cell N`",
            outcome.report.failed.len(),
            outcome.report.failed
        );
    }
    if outcome.report.cancelled {
        eprintln!("cancelled after {} turn(s)", outcome.report.executed);
    }
    Ok(())
}

pub async fn run_cell(session: &Session, file: &Path, cell: Option<usize>) -> anyhow::Result<()> {
    let driver = session.driver().await?;
    let stored = driver.load(file, &session.cancel).await?;
    let Some(last) = stored.cell_count().checked_sub(1) else {
        anyhow::bail!("{} has no turns to run", file.display());
    };
    let index = cell.unwrap_or(last);

    let mut notebook = EchoNotebook::new(stored);
    let result = driver.execute_cell(&mut notebook, index, &session.cancel).await;
    let notebook = notebook.finish();
    result?;

    persist(file, &serializer::from_notebook(&notebook.into_data())).await?;
    Ok(())
}

pub async fn edit_params(session: &Session, file: &Path) -> anyhow::Result<()> {
    let driver = GenerationDriver::without_runner(session.driver_config());
    let mut notebook = driver.load(file, &session.cancel).await?;
    let summary = ParameterStore::new()
        .edit_with_cancel(&mut notebook, &session.prompter, &session.cancel)
        .await;
    if summary.updated + summary.deleted > 0 {
        persist(file, &serializer::from_notebook(&notebook.snapshot())).await?;
    }
    println!(
        "{} parameter(s) updated, {} deleted",
        summary.updated, summary.deleted
    );
    Ok(())
}
