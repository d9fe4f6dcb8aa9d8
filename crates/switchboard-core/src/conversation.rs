//! Append-only conversation log replayed to the engine on every query.

use crate::error::ConversationError;
use crate::message::Message;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn to_message(&self) -> Message {
        match self.role {
            Role::User => Message::user(self.content.clone()),
            Role::Assistant => Message::assistant(self.content.clone()),
        }
    }
}

/// Ordered user/assistant turns.
///
/// Turns can only be appended, and must alternate starting with a user
/// turn; after `n` completed query cycles the log holds exactly `2n` turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Role the next appended turn must have
    pub fn expected_role(&self) -> Role {
        match self.turns.last() {
            Some(Turn {
                role: Role::User, ..
            }) => Role::Assistant,
            _ => Role::User,
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> Result<(), ConversationError> {
        self.append(Role::User, content.into())
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) -> Result<(), ConversationError> {
        self.append(Role::Assistant, content.into())
    }

    fn append(&mut self, role: Role, content: String) -> Result<(), ConversationError> {
        let expected = self.expected_role();
        if role != expected {
            return Err(ConversationError::OutOfOrder {
                expected,
                actual: role,
            });
        }
        self.turns.push(Turn { role, content });
        Ok(())
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The full log as engine messages, oldest first
    pub fn to_messages(&self) -> Vec<Message> {
        self.turns.iter().map(Turn::to_message).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageRole;

    #[test]
    fn test_turns_alternate() {
        let mut conversation = Conversation::new();
        assert_eq!(conversation.expected_role(), Role::User);

        conversation.push_user("what is 3 + 5?").unwrap();
        assert_eq!(conversation.expected_role(), Role::Assistant);
        conversation.push_assistant("8").unwrap();
        conversation.push_user("and times 12?").unwrap();
        conversation.push_assistant("96").unwrap();

        assert_eq!(conversation.len(), 4);
        let roles: Vec<_> = conversation.turns().iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            [Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
    }

    #[test]
    fn test_out_of_order_append_is_rejected() {
        let mut conversation = Conversation::new();
        assert_eq!(
            conversation.push_assistant("hi"),
            Err(ConversationError::OutOfOrder {
                expected: Role::User,
                actual: Role::Assistant
            })
        );
        conversation.push_user("one").unwrap();
        assert!(conversation.push_user("two").is_err());
        assert_eq!(conversation.len(), 1);
    }

    #[test]
    fn test_to_messages_preserves_order_and_roles() {
        let mut conversation = Conversation::new();
        conversation.push_user("q").unwrap();
        conversation.push_assistant("a").unwrap();

        let messages = conversation.to_messages();
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, "q");
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].content, "a");
    }
}
