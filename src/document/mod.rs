mod message;
mod state;

pub use message::{Message, ROLE_ASSISTANT, ROLE_SYSTEM, ROLE_USER};
pub use state::{ConversationDocument, Parameters, SEED_SYSTEM_PROMPT, SEED_USER_PROMPT};
