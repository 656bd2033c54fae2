use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::message::Message;

/// Free-form JSON-valued parameters attached to a document.
pub type Parameters = Map<String, Value>;

/// System text of the seed document synthesized when nothing is stored yet.
pub const SEED_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
/// User placeholder of the seed document.
pub const SEED_USER_PROMPT: &str = "";

/// An ordered list of turns plus the parameters used to run them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversationDocument {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub parameters: Parameters,
}

impl ConversationDocument {
    pub fn new(messages: Vec<Message>, parameters: Parameters) -> Self {
        Self {
            messages,
            parameters,
        }
    }

    /// A document made of one system turn and one user turn.
    pub fn seed(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self::new(
            vec![Message::system(system), Message::user(user)],
            Parameters::new(),
        )
    }

    /// The document used for empty or unreadable input.
    pub fn default_seed() -> Self {
        Self::seed(SEED_SYSTEM_PROMPT, SEED_USER_PROMPT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_seed_is_system_then_user() {
        let doc = ConversationDocument::default_seed();
        assert_eq!(doc.messages.len(), 2);
        assert_eq!(doc.messages[0], Message::system(SEED_SYSTEM_PROMPT));
        assert_eq!(doc.messages[1], Message::user(SEED_USER_PROMPT));
        assert!(doc.parameters.is_empty());
    }
}
