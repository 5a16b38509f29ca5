use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the kiosk conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered conversation history shared across a session's turns
#[derive(Clone, Debug)]
pub struct Context {
    messages: Arc<Mutex<Vec<ChatMessage>>>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn add_user_message(&self, content: impl Into<String>) {
        self.messages.lock().unwrap().push(ChatMessage::user(content));
    }

    pub async fn add_assistant_message(&self, content: impl Into<String>) {
        self.messages
            .lock()
            .unwrap()
            .push(ChatMessage::assistant(content));
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub async fn message_count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub async fn clear(&self) {
        self.messages.lock().unwrap().clear();
    }

    /// Conversation history in the shape rig's `Chat` trait expects
    #[cfg(feature = "rig")]
    pub async fn rig_messages(&self) -> Vec<rig::completion::Message> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|m| match m.role {
                Role::User => rig::completion::Message::user(m.content.clone()),
                Role::Assistant => rig::completion::Message::assistant(m.content.clone()),
            })
            .collect()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
