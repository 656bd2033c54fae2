//! Editable conversation documents.
//!
//! A [`ConversationDocument`] is an ordered list of role-tagged turns plus a
//! free-form parameter map. The [`serializer`] moves it between stored bytes
//! and a host cell view, the [`parameters`] module edits its parameters
//! interactively, and the [`driver`] appends turns and runs them through a
//! [`Runner`] one at a time.

pub mod document;
pub mod driver;
pub mod error;
pub mod notebook;
pub mod parameters;
pub mod prompt;
pub mod runner;
pub mod secret_store;
pub mod serializer;

pub use document::{ConversationDocument, Message, Parameters};
pub use driver::{DocumentRequest, DriverConfig, GenerationDriver};
pub use error::BookError;
pub use notebook::{CellData, CellKind, MemoryNotebook, Notebook, NotebookData};
pub use parameters::ParameterStore;
pub use prompt::{InputRequest, PickItem, Prompter};
pub use runner::{RunOutput, Runner};
