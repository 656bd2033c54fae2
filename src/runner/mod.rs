//! The capability that turns conversation history into assistant content.

mod chat_completions;
mod credentials;
mod sse;

pub use chat_completions::{ChatCompletionsConfig, ChatCompletionsRunner};
pub use credentials::{CredentialSource, StaticCredentials, CREDENTIAL_KEY};

use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::Stream;

use crate::document::{Message, Parameters};
use crate::error::BookError;

/// Incremental text deltas produced by a streaming run.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, BookError>> + Send>>;

/// What a run produced: the final text at once, or deltas to append as they arrive.
pub enum RunOutput {
    Complete(String),
    Stream(TextStream),
}

impl std::fmt::Debug for RunOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutput::Complete(text) => f.debug_tuple("Complete").field(text).finish(),
            RunOutput::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Produces the next assistant turn from the history so far.
#[async_trait]
pub trait Runner: Send + Sync {
    async fn generate(
        &self,
        history: &[Message],
        parameters: &Parameters,
    ) -> Result<RunOutput, BookError>;
}
