//! Conversion between stored bytes, [`ConversationDocument`] and the host
//! cell view.
//!
//! Two stored shapes are accepted: the legacy bare list of turns, and the
//! object form `{ "messages": [...], "parameters": {...} }`. Only the object
//! form is written, pretty-printed so the artifact diffs cleanly.

mod cells;

pub use cells::{from_notebook, to_notebook};

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::document::{ConversationDocument, Message, Parameters};
use crate::error::BookError;

/// Decode stored bytes, falling back to the seed document on empty or
/// unreadable input.
pub fn decode(bytes: &[u8]) -> ConversationDocument {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return ConversationDocument::default_seed();
    }
    match try_decode(bytes) {
        Ok(document) => document,
        Err(err) => {
            log::warn!("unreadable conversation document, using default: {err}");
            ConversationDocument::default_seed()
        }
    }
}

/// Same as [`decode`], but gives up with [`BookError::Cancelled`] once the
/// token fires.
pub fn decode_with_cancel(
    bytes: &[u8],
    cancel: &CancellationToken,
) -> Result<ConversationDocument, BookError> {
    if cancel.is_cancelled() {
        return Err(BookError::Cancelled);
    }
    let document = decode(bytes);
    if cancel.is_cancelled() {
        return Err(BookError::Cancelled);
    }
    Ok(document)
}

/// Encode a document as pretty-printed JSON (2-space indentation).
pub fn encode(document: &ConversationDocument) -> Vec<u8> {
    let value = serde_json::json!({
        "messages": document.messages,
        "parameters": document.parameters,
    });
    // Value serialization has no failure path.
    serde_json::to_vec_pretty(&value).unwrap_or_default()
}

fn try_decode(bytes: &[u8]) -> Result<ConversationDocument, BookError> {
    let value: Value = serde_json::from_slice(bytes)?;
    match value {
        Value::Array(_) => {
            let messages: Vec<Message> = serde_json::from_value(value)?;
            Ok(ConversationDocument::new(messages, Parameters::new()))
        }
        Value::Object(_) => Ok(serde_json::from_value(value)?),
        other => Err(BookError::Json(format!(
            "expected a list of messages or a document object, found {}",
            kind_name(&other)
        ))),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
