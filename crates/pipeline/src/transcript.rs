//! Session transcript: the ordered, append-only list of conversation messages.

use crate::models::{ConversationMessage, Sender};

#[derive(Debug, Clone, Default)]
pub struct SessionTranscript {
    messages: Vec<ConversationMessage>,
}

impl SessionTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return a copy of it.
    pub fn push(
        &mut self,
        sender: Sender,
        text: impl Into<String>,
        image: Option<String>,
    ) -> ConversationMessage {
        let message = ConversationMessage::new(sender, text, image);
        self.messages.push(message.clone());
        message
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    /// Most recent message from `sender`.
    pub fn last_from(&self, sender: Sender) -> Option<&ConversationMessage> {
        self.messages.iter().rev().find(|m| m.sender == sender)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_from_finds_most_recent() {
        let mut transcript = SessionTranscript::new();
        transcript.push(Sender::User, "first", None);
        transcript.push(Sender::Model, "reply", None);
        transcript.push(Sender::User, "second", Some("data:image/png;base64,AA==".into()));

        let last = transcript.last_from(Sender::User).unwrap();
        assert_eq!(last.text, "second");
        assert!(last.image.is_some());
        assert!(transcript.last_from(Sender::System).is_none());
        assert_eq!(transcript.len(), 3);
    }

    #[test]
    fn test_clear() {
        let mut transcript = SessionTranscript::new();
        transcript.push(Sender::System, "hello", None);
        transcript.clear();
        assert!(transcript.is_empty());
    }
}
