use serde::{Deserialize, Serialize};

use crate::chat::ChatMessage;

/// Ordered, append-only record of one chat session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    pub messages: Vec<ChatMessage>,
    /// Opaque identifier assigned by the remote side, echoed on later
    /// sends once known.
    pub conversation_id: Option<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Drops all messages and forgets the session identifier.
    pub fn clear(&mut self) {
        self.messages = Vec::new();
        self.conversation_id = None;
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
