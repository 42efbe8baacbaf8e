//! Chat room event and report definitions
//!
//! `ChatMessage` is what a session submits; `Report` is the structured
//! record the dispatcher emits once an event has been applied. Reports
//! serialize as a Serde tagged enum so a JSON sink can write them as-is.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// A message sent to the room
///
/// Immutable once built. The timestamp is taken at submission time, not
/// when the dispatcher gets to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    sender: String,
    body: String,
    sent_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a message stamped with the current time
    pub fn new(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            body: body.into(),
            sent_at: Utc::now(),
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn sent_at(&self) -> DateTime<Utc> {
        self.sent_at
    }
}

/// The three kinds of room events, one inbound queue each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Message,
    Join,
    Leave,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Message => "message",
            EventKind::Join => "join",
            EventKind::Leave => "leave",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of one processed room event
///
/// `seq` is the dispatcher's processing order: strictly increasing in the
/// order events were applied to the membership. Reports themselves may be
/// delivered to a sink in any order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    /// A chat message was relayed
    Message {
        seq: u64,
        sender: String,
        body: String,
        at: DateTime<Utc>,
    },
    /// A user joined; `changed` is false for a duplicate join
    Join {
        seq: u64,
        username: String,
        changed: bool,
        members: usize,
        at: DateTime<Utc>,
    },
    /// A user left; `changed` is false when they were not present
    Leave {
        seq: u64,
        username: String,
        changed: bool,
        members: usize,
        at: DateTime<Utc>,
    },
}

impl Report {
    pub fn kind(&self) -> EventKind {
        match self {
            Report::Message { .. } => EventKind::Message,
            Report::Join { .. } => EventKind::Join,
            Report::Leave { .. } => EventKind::Leave,
        }
    }

    pub fn seq(&self) -> u64 {
        match self {
            Report::Message { seq, .. } | Report::Join { seq, .. } | Report::Leave { seq, .. } => {
                *seq
            }
        }
    }

    /// Sender for messages, the joining/leaving user otherwise
    pub fn username(&self) -> &str {
        match self {
            Report::Message { sender, .. } => sender,
            Report::Join { username, .. } | Report::Leave { username, .. } => username,
        }
    }
}

/// Human-readable log line
impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Report::Message {
                sender, body, at, ..
            } => write!(
                f,
                "[{}] {}: {}",
                at.to_rfc3339_opts(SecondsFormat::Secs, true),
                sender,
                body
            ),
            Report::Join { username, .. } => write!(f, "{} joined the chat.", username),
            Report::Leave { username, .. } => write!(f, "{} left the chat.", username),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_chat_message_new() {
        let before = Utc::now();
        let msg = ChatMessage::new("bob", "hello");
        assert_eq!(msg.sender(), "bob");
        assert_eq!(msg.body(), "hello");
        assert!(msg.sent_at() >= before);
    }

    #[test]
    fn test_report_serialize() {
        let report = Report::Message {
            seq: 3,
            sender: "bob".to_string(),
            body: "hello".to_string(),
            at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "message");
        assert_eq!(json["seq"], 3);
        assert_eq!(json["sender"], "bob");
        assert_eq!(json["body"], "hello");
    }

    #[test]
    fn test_join_report_serialize() {
        let report = Report::Join {
            seq: 0,
            username: "alice".to_string(),
            changed: true,
            members: 1,
            at: Utc::now(),
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"kind\":\"join\""));
        assert!(json.contains("\"username\":\"alice\""));
        assert!(json.contains("\"members\":1"));
    }

    #[test]
    fn test_report_display() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let msg = Report::Message {
            seq: 0,
            sender: "bob".to_string(),
            body: "hi".to_string(),
            at,
        };
        assert_eq!(msg.to_string(), "[2024-05-01T12:00:00Z] bob: hi");

        let leave = Report::Leave {
            seq: 1,
            username: "bob".to_string(),
            changed: true,
            members: 0,
            at,
        };
        assert_eq!(leave.to_string(), "bob left the chat.");
        assert_eq!(leave.kind(), EventKind::Leave);
        assert_eq!(leave.username(), "bob");
        assert_eq!(leave.seq(), 1);
    }
}
