use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::validate::Violations;

/// Recipient meaning "everyone in the room".
pub const BROADCAST: &str = "Todos";
pub const ARRIVAL_TEXT: &str = "entra na sala...";
pub const DEPARTURE_TEXT: &str = "sai da sala...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Public chat, visible to every viewer.
    Message,
    PrivateMessage,
    /// Arrival/departure notice written by the server itself.
    Status,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        use MessageKind::*;
        match self {
            Message => "message",
            PrivateMessage => "private_message",
            Status => "status",
        }
    }

    /// Kinds a participant may choose when posting or editing.
    pub fn from_user_input(raw: &str) -> Option<Self> {
        match raw {
            "message" | "broadcast_message" => Some(MessageKind::Message),
            "private_message" => Some(MessageKind::PrivateMessage),
            _ => None,
        }
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "status" => Ok(MessageKind::Status),
            other => MessageKind::from_user_input(other)
                .ok_or_else(|| format!("unknown message kind {other:?}")),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub time: String,
}

/// A message that has not been stored yet: no id, no time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub from: String,
    pub to: String,
    pub text: String,
    pub kind: MessageKind,
}

impl MessageDraft {
    pub fn status(name: &str, text: &str) -> Self {
        MessageDraft {
            from: name.to_owned(),
            to: BROADCAST.to_owned(),
            text: text.to_owned(),
            kind: MessageKind::Status,
        }
    }

    pub fn check(&self) -> Result<(), Violations> {
        let mut violations = Violations::new();
        violations.non_empty("from", &self.from);
        violations.non_empty("to", &self.to);
        violations.non_empty("text", &self.text);
        violations.into_result(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_kinds_parse_back() {
        for kind in [MessageKind::Message, MessageKind::PrivateMessage, MessageKind::Status] {
            assert_eq!(kind.as_str().parse::<MessageKind>(), Ok(kind));
        }
        assert!("shout".parse::<MessageKind>().is_err());
    }

    #[test]
    fn status_is_not_user_input() {
        assert_eq!(MessageKind::from_user_input("status"), None);
        assert_eq!(
            MessageKind::from_user_input("broadcast_message"),
            Some(MessageKind::Message)
        );
    }

    #[test]
    fn kind_serializes_as_type() {
        let message = Message {
            id: "1".into(),
            from: "Alice".into(),
            to: BROADCAST.into(),
            text: ARRIVAL_TEXT.into(),
            kind: MessageKind::Status,
            time: "10:00:00".into(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "status");
        assert_eq!(json["to"], "Todos");
    }

    #[test]
    fn blank_draft_fields_fail_the_check() {
        let draft = MessageDraft {
            from: "Alice".into(),
            to: " ".into(),
            text: String::new(),
            kind: MessageKind::Message,
        };
        let fields: Vec<_> = draft.check().unwrap_err().iter().map(|v| v.field.clone()).collect();
        assert_eq!(fields, vec!["to", "text"]);
    }
}
