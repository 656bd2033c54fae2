use std::io::{self, Write};

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use chatbook::prompt::{InputRequest, PickItem, Prompter};

/// Typed at a value prompt to dismiss it.
const DISMISS: &str = ":q";

/// Line-based prompts on stdin/stdout. End of input or a cancelled token
/// dismisses any prompt.
pub struct TerminalPrompter<R = BufReader<Stdin>> {
    lines: Mutex<Lines<R>>,
    cancel: CancellationToken,
}

impl TerminalPrompter {
    pub fn new(cancel: CancellationToken) -> Self {
        Self::with_reader(BufReader::new(tokio::io::stdin()), cancel)
    }
}

impl<R> TerminalPrompter<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn with_reader(reader: R, cancel: CancellationToken) -> Self {
        Self {
            lines: Mutex::new(reader.lines()),
            cancel,
        }
    }

    async fn read_line(&self) -> Option<String> {
        let mut lines = self.lines.lock().await;
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                println!();
                log::debug!("prompt dismissed by cancellation");
                None
            }
            line = lines.next_line() => match line {
                Ok(line) => line,
                Err(err) => {
                    log::warn!("failed to read from stdin: {err}");
                    None
                }
            },
        }
    }
}

#[async_trait]
impl<R> Prompter for TerminalPrompter<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn pick(&self, title: &str, items: &[PickItem]) -> Option<usize> {
        loop {
            let mut menu = format!("\n{title}\n");
            for (i, item) in items.iter().enumerate() {
                match &item.detail {
                    Some(detail) => menu.push_str(&format!("  {:>2}) {}  {detail}\n", i + 1, item.label)),
                    None => menu.push_str(&format!("  {:>2}) {}\n", i + 1, item.label)),
                }
            }
            menu.push_str("Choice (empty to finish): ");
            print_prompt(&menu);

            let answer = self.read_line().await?;
            let answer = answer.trim();
            if answer.is_empty() {
                return None;
            }
            if let Some(index) = choose(answer, items) {
                return Some(index);
            }
            println!("'{answer}' is not one of the choices");
        }
    }

    async fn input(&self, request: &InputRequest) -> Option<String> {
        let mut text = String::new();
        if let Some(message) = &request.validation {
            text.push_str(&format!("  ! {message}\n"));
        }
        text.push_str(&request.title);
        if !request.value.is_empty() {
            text.push_str(&format!(" [{}]", request.value));
        }
        text.push_str(&format!(" ({DISMISS} to cancel): "));
        print_prompt(&text);

        let answer = self.read_line().await?;
        match answer.trim_end_matches('\r') {
            DISMISS => None,
            "" => Some(request.value.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// A 1-based number or an exact label.
fn choose(answer: &str, items: &[PickItem]) -> Option<usize> {
    if let Ok(number) = answer.parse::<usize>() {
        return (1..=items.len()).contains(&number).then(|| number - 1);
    }
    items.iter().position(|item| item.label == answer)
}

fn print_prompt(text: &str) {
    let mut stdout = io::stdout();
    if let Err(err) = stdout.write_all(text.as_bytes()).and_then(|_| stdout.flush()) {
        log::warn!("failed to write prompt: {err}");
    }
}
