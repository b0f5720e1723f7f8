use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub is_error: bool,
    pub created_at: DateTime<Local>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            is_error: false,
            created_at: Local::now(),
        }
    }

    pub fn error(role: Role, content: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::new(role, content)
        }
    }
}

/// Append-only conversation as shown to the user.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_keep_order_and_unique_ids() {
        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::new(Role::Model, "Hey there!"));
        transcript.push(ChatMessage::new(Role::User, "What's my EMI?"));
        transcript.push(ChatMessage::error(Role::Model, "Sorry"));

        let roles: Vec<Role> = transcript.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::Model, Role::User, Role::Model]);
        assert_ne!(transcript.messages()[0].id, transcript.messages()[1].id);
        assert!(transcript.last().unwrap().is_error);
        assert!(!transcript.messages()[0].is_error);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Role::Model).unwrap(), "model");
        assert_eq!(serde_json::to_value(Role::System).unwrap(), "system");
    }
}
