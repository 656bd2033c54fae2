use serde::{Deserialize, Serialize};

/// Conventional role tags. Roles are free-form strings; these are only the
/// ones the driver produces itself.
pub const ROLE_SYSTEM: &str = "system";
pub const ROLE_USER: &str = "user";
pub const ROLE_ASSISTANT: &str = "assistant";

/// A single role-tagged turn of a conversation.
///
/// Stored entries may lack either field; both default to the empty string
/// when decoded so older or hand-edited files still load.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    /// Who produced the turn (`system`, `user`, `assistant`, or anything else)
    #[serde(default)]
    pub role: String,
    /// The text of the turn
    #[serde(default)]
    pub content: String,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ROLE_SYSTEM, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ROLE_USER, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ROLE_ASSISTANT, content)
    }
}
