//! Interactive editing of the parameter mapping kept in a notebook's
//! metadata slot.

mod parse;

pub use parse::{is_delete_sentinel, parse_lenient, render};

use std::future::Future;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::document::Parameters;
use crate::notebook::Notebook;
use crate::prompt::{InputRequest, PickItem, Prompter};

const PICK_TITLE: &str = "Select a parameter to edit";
const CREATE_LABEL: &str = "+ Add new parameter";
const NAME_TITLE: &str = "Parameter name";
const INVALID_VALUE: &str = "Invalid JSON value";

/// Counts of what one editing session changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditSummary {
    pub updated: usize,
    pub deleted: usize,
}

/// Add/edit/delete loop over a notebook's parameters.
#[derive(Debug, Clone, Default)]
pub struct ParameterStore;

impl ParameterStore {
    pub fn new() -> Self {
        Self
    }

    /// Run the picker until the user dismisses it.
    ///
    /// Every commit re-reads the current mapping and writes it back whole.
    pub async fn edit<N, P>(&self, notebook: &mut N, prompter: &P) -> EditSummary
    where
        N: Notebook + ?Sized,
        P: Prompter + ?Sized,
    {
        self.edit_with_cancel(notebook, prompter, &CancellationToken::new())
            .await
    }

    /// Like [`edit`](Self::edit), but a cancelled token dismisses whatever
    /// prompt is open and ends the session. A value being typed when the
    /// token fires is not committed.
    pub async fn edit_with_cancel<N, P>(
        &self,
        notebook: &mut N,
        prompter: &P,
        cancel: &CancellationToken,
    ) -> EditSummary
    where
        N: Notebook + ?Sized,
        P: Prompter + ?Sized,
    {
        let mut summary = EditSummary::default();
        loop {
            if cancel.is_cancelled() {
                log::debug!("parameter session cancelled");
                break;
            }
            let parameters = notebook.metadata();
            let keys: Vec<String> = parameters.keys().cloned().collect();
            let items = pick_items(&parameters);
            let Some(choice) = unless_cancelled(cancel, prompter.pick(PICK_TITLE, &items)).await
            else {
                break;
            };

            let (key, current) = if choice == 0 {
                let request = InputRequest::new(NAME_TITLE);
                let Some(name) = unless_cancelled(cancel, prompter.input(&request)).await else {
                    break;
                };
                let name = name.trim().to_string();
                if name.is_empty() {
                    continue;
                }
                (name, None)
            } else {
                match keys.get(choice - 1) {
                    Some(key) => (key.clone(), parameters.get(key).cloned()),
                    None => continue,
                }
            };

            let Some(value) = self
                .prompt_value(prompter, &key, current.as_ref(), cancel)
                .await
            else {
                break;
            };
            if is_delete_sentinel(&value) {
                if current.is_some() {
                    summary.deleted += 1;
                }
            } else {
                summary.updated += 1;
            }
            let updated = apply(notebook.metadata(), &key, value);
            notebook.set_metadata(updated);
        }
        log::debug!(
            "parameter session finished: {} updated, {} deleted",
            summary.updated,
            summary.deleted
        );
        summary
    }

    /// Ask for a value until it parses or the prompt is dismissed.
    async fn prompt_value<P>(
        &self,
        prompter: &P,
        key: &str,
        current: Option<&Value>,
        cancel: &CancellationToken,
    ) -> Option<Value>
    where
        P: Prompter + ?Sized,
    {
        let mut request = InputRequest::new(format!("Value for '{key}'"))
            .value(current.map(render).unwrap_or_default());
        loop {
            let input = unless_cancelled(cancel, prompter.input(&request)).await?;
            match parse_lenient(&input) {
                Some(value) => return Some(value),
                None => {
                    request = request.value(input).validation(INVALID_VALUE);
                }
            }
        }
    }
}

/// Commit one value into a full copy of the mapping. The empty string
/// removes the key.
pub fn apply(mut parameters: Parameters, key: &str, value: Value) -> Parameters {
    if is_delete_sentinel(&value) {
        parameters.remove(key);
    } else {
        parameters.insert(key.to_string(), value);
    }
    parameters
}

/// Resolve to `None` as soon as `cancel` fires, dropping the open prompt.
async fn unless_cancelled<T>(
    cancel: &CancellationToken,
    prompt: impl Future<Output = Option<T>>,
) -> Option<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        answer = prompt => answer,
    }
}

fn pick_items(parameters: &Parameters) -> Vec<PickItem> {
    std::iter::once(PickItem::new(CREATE_LABEL))
        .chain(
            parameters
                .iter()
                .map(|(key, value)| PickItem::new(key.clone()).with_detail(render(value))),
        )
        .collect()
}
