//! Interactive surface injected by the host: a picker and a text prompt.

use async_trait::async_trait;

/// One entry of a picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickItem {
    pub label: String,
    pub detail: Option<String>,
}

impl PickItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// A single-line text prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputRequest {
    pub title: String,
    /// Pre-filled value
    pub value: String,
    /// Message shown when the previous answer was rejected
    pub validation: Option<String>,
}

impl InputRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn validation(mut self, message: impl Into<String>) -> Self {
        self.validation = Some(message.into());
        self
    }
}

/// Host prompts. `None` means the user dismissed the prompt.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Returns the index of the chosen item.
    async fn pick(&self, title: &str, items: &[PickItem]) -> Option<usize>;

    /// Returns the entered text; an empty string is a confirmed blank entry.
    async fn input(&self, request: &InputRequest) -> Option<String>;
}
