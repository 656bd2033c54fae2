//! Creates conversation artifacts and executes them turn by turn.
//!
//! Chunks are processed strictly in order: a user turn is appended, the
//! runner is invoked on the history so far, and its output (including a
//! fully drained stream) lands in the notebook before the next chunk is
//! touched.

mod chunks;
mod naming;

pub use chunks::{split_chunks, ChunkMode};
pub use naming::artifact_name;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::document::{
    ConversationDocument, Message, Parameters, ROLE_ASSISTANT, ROLE_SYSTEM, ROLE_USER,
};
use crate::error::BookError;
use crate::notebook::{CellData, MemoryNotebook, Notebook, NotebookData};
use crate::prompt::{InputRequest, Prompter};
use crate::runner::{RunOutput, Runner};
use crate::serializer;

/// Placeholder replaced by the target language in the instruction template.
pub const LANGUAGE_PLACEHOLDER: &str = "{language}";

const DEFAULT_INSTRUCTION: &str =
    "You are a translator. Translate every user message into {language}. Reply with the translation only.";

/// Settings for document creation and execution.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub instruction_template: String,
    pub default_language: String,
    pub extension: String,
    /// Directory receiving new artifacts; creation fails without it
    pub storage_root: Option<PathBuf>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            instruction_template: DEFAULT_INSTRUCTION.to_string(),
            default_language: "English".to_string(),
            extension: "chatbook".to_string(),
            storage_root: None,
        }
    }
}

/// A request to create (and possibly execute) a document.
#[derive(Debug, Clone, Default)]
pub struct DocumentRequest {
    /// Base of the artifact name, e.g. the source file stem
    pub identity: Option<String>,
    pub content: Option<String>,
    /// Target language; prompted for when absent
    pub language: Option<String>,
}

/// A freshly persisted artifact.
#[derive(Debug, Clone)]
pub struct CreatedDocument {
    pub path: PathBuf,
    pub language: String,
    pub document: ConversationDocument,
}

/// What the chunk loop did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub executed: usize,
    /// Indices of user cells whose run failed
    pub failed: Vec<usize>,
    pub cancelled: bool,
}

/// Result of a full translation: the artifact and how its execution went.
#[derive(Debug, Clone)]
pub struct TranslationOutcome {
    pub path: PathBuf,
    pub report: ExecutionReport,
}

pub struct GenerationDriver {
    runner: Arc<dyn Runner>,
    config: DriverConfig,
}

impl GenerationDriver {
    pub fn new(runner: Arc<dyn Runner>, config: DriverConfig) -> Self {
        Self { runner, config }
    }

    /// A driver that can create and load documents but not run them.
    pub fn without_runner(config: DriverConfig) -> Self {
        Self::new(Arc::new(NoRunner), config)
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// The system instruction for `language`.
    pub fn instruction(&self, language: &str) -> String {
        self.config
            .instruction_template
            .replace(LANGUAGE_PLACEHOLDER, language)
    }

    /// Use the requested language, or ask for one pre-filled with the default.
    pub async fn resolve_language<P>(
        &self,
        requested: Option<&str>,
        prompter: &P,
    ) -> Result<String, BookError>
    where
        P: Prompter + ?Sized,
    {
        if let Some(language) = requested.map(str::trim).filter(|l| !l.is_empty()) {
            return Ok(language.to_string());
        }
        let request = InputRequest::new("Target language").value(&self.config.default_language);
        prompter
            .input(&request)
            .await
            .map(|answer| answer.trim().to_string())
            .filter(|answer| !answer.is_empty())
            .ok_or_else(|| BookError::MissingInput("target language".to_string()))
    }

    /// Build the seed document and write it under the storage root.
    pub async fn create<P>(
        &self,
        request: &DocumentRequest,
        prompter: &P,
    ) -> Result<CreatedDocument, BookError>
    where
        P: Prompter + ?Sized,
    {
        let identity = request
            .identity
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| BookError::MissingInput("document identity".to_string()))?;
        let language = self
            .resolve_language(request.language.as_deref(), prompter)
            .await?;
        let document = ConversationDocument::seed(
            self.instruction(&language),
            request.content.clone().unwrap_or_default(),
        );

        let root = self
            .config
            .storage_root
            .as_ref()
            .ok_or_else(|| BookError::MissingInput("storage root".to_string()))?;
        tokio::fs::create_dir_all(root).await?;
        let path = root.join(artifact_name(identity, Utc::now(), &self.config.extension));
        persist(&path, &document).await?;
        log::info!("created conversation document {}", path.display());

        Ok(CreatedDocument {
            path,
            language,
            document,
        })
    }

    /// Load an artifact into a notebook view.
    pub async fn load(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<MemoryNotebook, BookError> {
        let bytes = tokio::fs::read(path).await?;
        let document = serializer::decode_with_cancel(&bytes, cancel)?;
        Ok(MemoryNotebook::from(serializer::to_notebook(&document)))
    }

    /// Append the instruction, then run every non-blank chunk in order.
    ///
    /// A failed run is logged and recorded; later chunks still execute.
    pub async fn run_chunks<N>(
        &self,
        notebook: &mut N,
        language: &str,
        chunks: &[String],
        cancel: &CancellationToken,
    ) -> Result<ExecutionReport, BookError>
    where
        N: Notebook + ?Sized,
    {
        let mut report = ExecutionReport::default();
        notebook.push_cell(CellData::code(ROLE_SYSTEM, self.instruction(language)))?;

        for chunk in chunks.iter().filter(|chunk| !chunk.trim().is_empty()) {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            let index = notebook.push_cell(CellData::code(ROLE_USER, chunk.clone()))?;
            match self.execute_cell(notebook, index, cancel).await {
                Ok(_) => report.executed += 1,
                Err(BookError::Cancelled) => {
                    report.cancelled = true;
                    break;
                }
                Err(err) => {
                    log::error!("run for cell {index} failed: {err}");
                    report.failed.push(index);
                }
            }
        }
        Ok(report)
    }

    /// Run the turn at `index` against the cells up to and including it and
    /// write the output into a new assistant cell right after it. Returns
    /// the index of that cell.
    pub async fn execute_cell<N>(
        &self,
        notebook: &mut N,
        index: usize,
        cancel: &CancellationToken,
    ) -> Result<usize, BookError>
    where
        N: Notebook + ?Sized,
    {
        let count = notebook.cell_count();
        if index >= count {
            return Err(BookError::CellOutOfRange { index, count });
        }
        let mut cells = notebook.cells();
        cells.truncate(index + 1);
        let parameters = notebook.metadata();
        let history = serializer::from_notebook(&NotebookData {
            cells,
            metadata: parameters.clone(),
        })
        .messages;
        log::debug!("running cell {index} with {} turns of history", history.len());

        let output = tokio::select! {
            _ = cancel.cancelled() => return Err(BookError::Cancelled),
            output = self.runner.generate(&history, &parameters) => output?,
        };

        let target = index + 1;
        notebook.insert_cell(target, CellData::code(ROLE_ASSISTANT, String::new()))?;
        match output {
            RunOutput::Complete(text) => notebook.append_text(target, &text)?,
            RunOutput::Stream(mut stream) => loop {
                let next = tokio::select! {
                    _ = cancel.cancelled() => return Err(BookError::Cancelled),
                    next = stream.next() => next,
                };
                match next {
                    Some(delta) => notebook.append_text(target, &delta?)?,
                    None => break,
                }
            },
        }
        Ok(target)
    }

    /// Create an artifact for `request`, open it in `notebook` (expected
    /// empty), execute its content chunk by chunk after the seed turns and
    /// persist the executed conversation over the artifact.
    pub async fn translate<N, P>(
        &self,
        request: &DocumentRequest,
        mode: ChunkMode,
        notebook: &mut N,
        prompter: &P,
        cancel: &CancellationToken,
    ) -> Result<TranslationOutcome, BookError>
    where
        N: Notebook + ?Sized,
        P: Prompter + ?Sized,
    {
        let content = request
            .content
            .clone()
            .ok_or_else(|| BookError::MissingInput("content to translate".to_string()))?;
        let created = self.create(request, prompter).await?;

        let stored = self.load(&created.path, cancel).await?.into_data();
        notebook.set_metadata(stored.metadata);
        for cell in stored.cells {
            notebook.push_cell(cell)?;
        }
        let chunks = split_chunks(&content, mode);
        let report = self
            .run_chunks(notebook, &created.language, &chunks, cancel)
            .await?;

        let executed = serializer::from_notebook(&notebook.snapshot());
        persist(&created.path, &executed).await?;
        log::info!(
            "translated {} chunk(s) into {} ({} failed)",
            report.executed,
            created.path.display(),
            report.failed.len()
        );
        Ok(TranslationOutcome {
            path: created.path,
            report,
        })
    }
}

struct NoRunner;

#[async_trait]
impl Runner for NoRunner {
    async fn generate(
        &self,
        _history: &[Message],
        _parameters: &Parameters,
    ) -> Result<RunOutput, BookError> {
        Err(BookError::Runner("no runner configured".to_string()))
    }
}

/// Write a document to `path`.
///
/// The bytes go to a sibling `.tmp` file that is renamed over `path`, so a
/// failed write leaves any previous artifact untouched.
pub async fn persist(path: &Path, document: &ConversationDocument) -> Result<(), BookError> {
    let staging = staging_path(path);
    let written = match tokio::fs::write(&staging, serializer::encode(document)).await {
        Ok(()) => tokio::fs::rename(&staging, path).await,
        Err(err) => Err(err),
    };
    if let Err(err) = written {
        if let Err(cleanup) = tokio::fs::remove_file(&staging).await {
            log::debug!("no staging file to clean up at {}: {cleanup}", staging.display());
        }
        return Err(err.into());
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    PathBuf::from(staging)
}

#[cfg(test)]
mod tests;
