use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::*;
use crate::prompt::PickItem;

type EventLog = Arc<Mutex<Vec<String>>>;

fn push(log: &EventLog, event: String) {
    log.lock().expect("event lock").push(event);
}

fn events(log: &EventLog) -> Vec<String> {
    log.lock().expect("event lock").clone()
}

/// Uppercases the last turn; streams it one character at a time and logs
/// when each run starts and when its stream is drained.
struct EchoRunner {
    log: EventLog,
    stream: bool,
    fail_on: Option<&'static str>,
    histories: Mutex<Vec<Vec<Message>>>,
}

impl EchoRunner {
    fn new(log: EventLog, stream: bool) -> Self {
        Self {
            log,
            stream,
            fail_on: None,
            histories: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Runner for EchoRunner {
    async fn generate(
        &self,
        history: &[Message],
        _parameters: &Parameters,
    ) -> Result<RunOutput, BookError> {
        self.histories
            .lock()
            .expect("history lock")
            .push(history.to_vec());
        let last = history.last().map(|m| m.content.clone()).unwrap_or_default();
        push(&self.log, format!("run {last}"));
        if self.fail_on == Some(last.as_str()) {
            return Err(BookError::Runner("model unavailable".to_string()));
        }
        tokio::task::yield_now().await;
        let reply = last.to_uppercase();
        if !self.stream {
            push(&self.log, format!("done {last}"));
            return Ok(RunOutput::Complete(reply));
        }
        let log = Arc::clone(&self.log);
        let deltas: Vec<String> = reply.chars().map(String::from).collect();
        let stream = futures::stream::unfold(
            (deltas.into_iter(), log, last),
            |(mut deltas, log, last)| async move {
                tokio::task::yield_now().await;
                match deltas.next() {
                    Some(delta) => Some((Ok::<_, BookError>(delta), (deltas, log, last))),
                    None => {
                        push(&log, format!("done {last}"));
                        None
                    }
                }
            },
        );
        Ok(RunOutput::Stream(Box::pin(stream)))
    }
}

/// Notebook that logs every inserted user cell into the shared event log.
struct LoggingNotebook {
    inner: MemoryNotebook,
    log: EventLog,
}

impl Notebook for LoggingNotebook {
    fn cells(&self) -> Vec<CellData> {
        self.inner.cells()
    }

    fn cell_count(&self) -> usize {
        self.inner.cell_count()
    }

    fn insert_cell(&mut self, index: usize, cell: CellData) -> Result<(), BookError> {
        if cell.language == ROLE_USER {
            push(&self.log, format!("append {}", cell.text));
        }
        self.inner.insert_cell(index, cell)
    }

    fn append_text(&mut self, index: usize, delta: &str) -> Result<(), BookError> {
        self.inner.append_text(index, delta)
    }

    fn metadata(&self) -> Parameters {
        self.inner.metadata()
    }

    fn set_metadata(&mut self, metadata: Parameters) {
        self.inner.set_metadata(metadata)
    }
}

/// Answers every text prompt with a fixed value; pickers are never expected.
struct FixedPrompter(Option<&'static str>);

#[async_trait]
impl Prompter for FixedPrompter {
    async fn pick(&self, _title: &str, _items: &[PickItem]) -> Option<usize> {
        panic!("no picker expected");
    }

    async fn input(&self, _request: &InputRequest) -> Option<String> {
        self.0.map(str::to_string)
    }
}

struct NoPrompts;

#[async_trait]
impl Prompter for NoPrompts {
    async fn pick(&self, _title: &str, _items: &[PickItem]) -> Option<usize> {
        panic!("no picker expected");
    }

    async fn input(&self, _request: &InputRequest) -> Option<String> {
        panic!("no prompt expected");
    }
}

fn make_driver(runner: EchoRunner, root: Option<PathBuf>) -> (GenerationDriver, Arc<EchoRunner>) {
    let runner = Arc::new(runner);
    let config = DriverConfig {
        storage_root: root,
        ..DriverConfig::default()
    };
    (GenerationDriver::new(runner.clone(), config), runner)
}

fn chunks(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn chunks_run_strictly_in_order_and_blank_chunks_are_skipped() {
    let log = EventLog::default();
    let (driver, runner) = make_driver(EchoRunner::new(log.clone(), true), None);
    let mut notebook = LoggingNotebook {
        inner: MemoryNotebook::new(),
        log: log.clone(),
    };

    let report = driver
        .run_chunks(&mut notebook, "English", &chunks(&["a", "", "b"]), &CancellationToken::new())
        .await
        .expect("run");

    assert_eq!(report, ExecutionReport { executed: 2, failed: vec![], cancelled: false });
    assert_eq!(
        events(&log),
        vec!["append a", "run a", "done a", "append b", "run b", "done b"]
    );

    let cells = notebook.cells();
    let roles: Vec<&str> = cells.iter().map(|c| c.language.as_str()).collect();
    assert_eq!(roles, vec!["system", "user", "assistant", "user", "assistant"]);
    assert_eq!(cells[2].text, "A");
    assert_eq!(cells[4].text, "B");
    assert_eq!(cells[0].text, driver.instruction("English"));

    let histories = runner.histories.lock().expect("history lock");
    assert_eq!(histories[0].len(), 2);
    assert_eq!(histories[1].len(), 4);
    assert_eq!(histories[1][2], Message::assistant("A"));
}

#[tokio::test]
async fn failed_run_is_recorded_and_later_chunks_continue() {
    let log = EventLog::default();
    let mut runner = EchoRunner::new(log.clone(), false);
    runner.fail_on = Some("bad");
    let (driver, _) = make_driver(runner, None);
    let mut notebook = MemoryNotebook::new();

    let report = driver
        .run_chunks(&mut notebook, "French", &chunks(&["bad", "good"]), &CancellationToken::new())
        .await
        .expect("run");

    assert_eq!(report.executed, 1);
    assert_eq!(report.failed, vec![1]);
    let texts: Vec<String> = notebook.cells().into_iter().map(|c| c.text).collect();
    assert_eq!(texts[1..], ["bad", "good", "GOOD"]);
}

#[tokio::test]
async fn cancelled_token_stops_before_next_chunk() {
    let log = EventLog::default();
    let (driver, _) = make_driver(EchoRunner::new(log.clone(), false), None);
    let mut notebook = MemoryNotebook::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = driver
        .run_chunks(&mut notebook, "English", &chunks(&["a"]), &cancel)
        .await
        .expect("run");
    assert!(report.cancelled);
    assert_eq!(notebook.cell_count(), 1);
    assert!(events(&log).is_empty());
}

#[tokio::test]
async fn execute_cell_uses_history_up_to_index() {
    let log = EventLog::default();
    let (driver, runner) = make_driver(EchoRunner::new(log, false), None);
    let mut notebook = MemoryNotebook::with_metadata(Parameters::new());
    for cell in [
        CellData::code("system", "sys"),
        CellData::markup("note"),
        CellData::code("user", "one"),
        CellData::code("user", "two"),
    ] {
        notebook.push_cell(cell).expect("push");
    }

    let target = driver
        .execute_cell(&mut notebook, 2, &CancellationToken::new())
        .await
        .expect("execute");
    assert_eq!(target, 3);
    assert_eq!(notebook.cells()[3], CellData::code("assistant", "ONE"));
    assert_eq!(notebook.cells()[4].text, "two");
    let histories = runner.histories.lock().expect("history lock");
    assert_eq!(histories[0], vec![Message::system("sys"), Message::user("one")]);

    let err = driver
        .execute_cell(&mut notebook, 9, &CancellationToken::new())
        .await
        .expect_err("out of range");
    assert!(matches!(err, BookError::CellOutOfRange { index: 9, count: 5 }));
}

#[tokio::test]
async fn create_writes_timestamped_seed_document() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (driver, _) = make_driver(EchoRunner::new(EventLog::default(), false), Some(dir.path().to_path_buf()));
    let request = DocumentRequest {
        identity: Some("notes".to_string()),
        content: Some("Bonjour".to_string()),
        language: None,
    };

    let created = driver
        .create(&request, &FixedPrompter(Some("German")))
        .await
        .expect("create");

    let name = created.path.file_name().and_then(|n| n.to_str()).expect("name");
    assert!(name.starts_with("notes-"));
    assert!(name.ends_with("Z.chatbook"));
    assert!(!name.contains(':'));
    assert_eq!(created.language, "German");

    let stored = serializer::decode(&std::fs::read(&created.path).expect("read"));
    assert_eq!(
        stored.messages,
        vec![Message::system(driver.instruction("German")), Message::user("Bonjour")]
    );
}

#[tokio::test]
async fn missing_identity_aborts_without_prompting() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (driver, _) = make_driver(EchoRunner::new(EventLog::default(), false), Some(dir.path().to_path_buf()));
    let err = driver
        .create(&DocumentRequest::default(), &NoPrompts)
        .await
        .expect_err("missing identity");
    assert!(matches!(err, BookError::MissingInput(_)));
    assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 0);
}

#[tokio::test]
async fn missing_storage_root_aborts_before_writing() {
    let (driver, _) = make_driver(EchoRunner::new(EventLog::default(), false), None);
    let request = DocumentRequest {
        identity: Some("notes".to_string()),
        content: None,
        language: Some("English".to_string()),
    };
    let err = driver.create(&request, &NoPrompts).await.expect_err("no root");
    assert!(matches!(err, BookError::MissingInput(what) if what == "storage root"));
}

#[tokio::test]
async fn dismissed_language_prompt_aborts() {
    let (driver, _) = make_driver(EchoRunner::new(EventLog::default(), false), None);
    let err = driver
        .resolve_language(None, &FixedPrompter(None))
        .await
        .expect_err("dismissed");
    assert!(matches!(err, BookError::MissingInput(_)));
    assert_eq!(
        driver
            .resolve_language(Some(" Spanish "), &NoPrompts)
            .await
            .expect("given"),
        "Spanish"
    );
}

#[tokio::test]
async fn translate_persists_executed_conversation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (driver, _) = make_driver(EchoRunner::new(EventLog::default(), true), Some(dir.path().to_path_buf()));
    let request = DocumentRequest {
        identity: Some("letter".to_string()),
        content: Some("hello\n\nworld".to_string()),
        language: Some("Italian".to_string()),
    };

    let outcome = driver
        .translate(
            &request,
            ChunkMode::Lines,
            &mut MemoryNotebook::new(),
            &NoPrompts,
            &CancellationToken::new(),
        )
        .await
        .expect("translate");
    assert_eq!(outcome.report.executed, 2);

    let stored = serializer::decode(&std::fs::read(&outcome.path).expect("read"));
    let instruction = driver.instruction("Italian");
    assert_eq!(
        stored.messages[..2],
        [Message::system(instruction.clone()), Message::user("hello\n\nworld")]
    );
    assert_eq!(stored.messages[2], Message::system(instruction));
    let contents: Vec<&str> = stored.messages[3..].iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, ["hello", "HELLO", "world", "WORLD"]);
    assert_eq!(stored.parameters, Parameters::new());
}

#[tokio::test]
async fn translate_without_content_is_missing_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (driver, _) = make_driver(EchoRunner::new(EventLog::default(), false), Some(dir.path().to_path_buf()));
    let request = DocumentRequest {
        identity: Some("letter".to_string()),
        content: None,
        language: Some("Italian".to_string()),
    };
    let err = driver
        .translate(
            &request,
            ChunkMode::Whole,
            &mut MemoryNotebook::new(),
            &NoPrompts,
            &CancellationToken::new(),
        )
        .await
        .expect_err("no content");
    assert!(matches!(err, BookError::MissingInput(_)));
    assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 0);
}

#[test]
fn instruction_substitutes_language() {
    let (driver, _) = make_driver(EchoRunner::new(EventLog::default(), false), None);
    let text = driver.instruction("Japanese");
    assert!(text.contains("Japanese"));
    assert!(!text.contains(LANGUAGE_PLACEHOLDER));
}

#[tokio::test]
async fn driver_without_runner_reports_runner_error() {
    let driver = GenerationDriver::without_runner(DriverConfig::default());
    let mut notebook = MemoryNotebook::new();
    notebook.push_cell(CellData::code("user", "hi")).expect("push");
    let err = driver
        .execute_cell(&mut notebook, 0, &CancellationToken::new())
        .await
        .expect_err("no runner");
    assert!(matches!(err, BookError::Runner(_)));
    assert_eq!(notebook.cell_count(), 1);
}

#[tokio::test]
async fn persist_replaces_artifact_without_leftovers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("doc.chatbook");
    std::fs::write(&path, "old").expect("write");

    let document = ConversationDocument::seed("sys", "hi");
    persist(&path, &document).await.expect("persist");

    let stored = serializer::decode(&std::fs::read(&path).expect("read"));
    assert_eq!(stored, document);
    let names: Vec<_> = std::fs::read_dir(dir.path())
        .expect("read dir")
        .map(|entry| entry.expect("entry").file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("doc.chatbook")]);
}

#[tokio::test]
async fn failed_persist_keeps_what_was_there() {
    let dir = tempfile::tempdir().expect("tempdir");
    // A non-empty directory cannot be replaced by a file.
    let path = dir.path().join("doc.chatbook");
    std::fs::create_dir(&path).expect("mkdir");
    std::fs::write(path.join("keep"), "x").expect("write");

    let err = persist(&path, &ConversationDocument::default_seed())
        .await
        .expect_err("rename over a directory");
    assert!(matches!(err, BookError::Io(_)));
    assert!(path.join("keep").exists());
    assert!(!staging_path(&path).exists());
}
