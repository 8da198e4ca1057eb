//! Conversation history as seen by the pipeline
//!
//! History is owned by the caller and passed in per request. The pipeline
//! only flattens it into a transcript (`sender: text` per line) for prompting
//! and for the "already mentioned" check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// End user
    User,
    /// Model reply
    #[serde(rename = "ai", alias = "assistant", alias = "bot")]
    Assistant,
    /// Notices and errors shown in the chat
    #[serde(alias = "error")]
    System,
}

impl Sender {
    /// Label used in transcripts
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "ai",
            Sender::System => "system",
        }
    }
}

/// One message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Author
    pub sender: Sender,
    /// Message text
    pub text: String,
    /// When the message was sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ConversationTurn {
    /// Turn without a timestamp
    #[must_use]
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: None,
        }
    }
}

/// Flatten turns into a `sender: text` transcript, one turn per line
#[must_use]
pub fn transcript(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .map(|turn| format!("{}: {}", turn.sender.as_str(), turn.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_format() {
        let turns = vec![
            ConversationTurn::new(Sender::User, "How is AAPL?"),
            ConversationTurn::new(Sender::Assistant, "Up 1%."),
        ];
        assert_eq!(transcript(&turns), "user: How is AAPL?\nai: Up 1%.");
    }

    #[test]
    fn test_empty_transcript() {
        assert_eq!(transcript(&[]), "");
    }

    #[test]
    fn test_sender_wire_names() {
        let turn: ConversationTurn =
            serde_json::from_str(r#"{"sender":"assistant","text":"hi"}"#).unwrap();
        assert_eq!(turn.sender, Sender::Assistant);

        let turn: ConversationTurn =
            serde_json::from_str(r#"{"sender":"error","text":"oops","timestamp":"2024-03-05T14:30:00Z"}"#)
                .unwrap();
        assert_eq!(turn.sender, Sender::System);
        assert!(turn.timestamp.is_some());

        let json = serde_json::to_value(ConversationTurn::new(Sender::Assistant, "x")).unwrap();
        assert_eq!(json["sender"], "ai");
        assert!(json.get("timestamp").is_none());
    }
}
