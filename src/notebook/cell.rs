use serde::{Deserialize, Serialize};

use crate::document::Parameters;

/// Kind of a host cell. Only `Code` cells carry conversation turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Code,
    Markup,
}

/// One editable unit of the host view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellData {
    pub kind: CellKind,
    /// Language tag; for turns this is the role
    pub language: String,
    pub text: String,
}

impl CellData {
    pub fn code(language: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: CellKind::Code,
            language: language.into(),
            text: text.into(),
        }
    }

    pub fn markup(text: impl Into<String>) -> Self {
        Self {
            kind: CellKind::Markup,
            language: "markdown".to_string(),
            text: text.into(),
        }
    }

    pub fn is_code(&self) -> bool {
        self.kind == CellKind::Code
    }
}

/// The whole cell-list view: ordered cells plus one metadata slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NotebookData {
    pub cells: Vec<CellData>,
    pub metadata: Parameters,
}
