//! Request bodies and the checks that turn them into typed commands.
//!
//! Every body field is optional at the serde layer so that a missing field
//! shows up as a [`FieldViolation`] instead of an opaque deserialization
//! failure. Rendered violations read like `"text" is required`.

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::messages::{MessageDraft, MessageKind};

/// Keys a message body may carry that are accepted and then ignored;
/// `from` and `time` are always assigned by the server.
const IGNORED_MESSAGE_KEYS: &[&str] = &["from", "time"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\" {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut violations = Self::new();
        violations.push(field, message);
        violations
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldViolation> {
        self.0.iter()
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    /// Records a violation when `value` is blank.
    pub fn non_empty(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "is not allowed to be empty");
        }
    }

    /// Unwraps a required field, recording a violation when it is missing or
    /// blank. The returned string is only meaningful if no violation was added.
    pub fn required(&mut self, field: &str, value: Option<String>) -> String {
        match value {
            Some(value) => {
                self.non_empty(field, &value);
                value
            }
            None => {
                self.push(field, "is required");
                String::new()
            }
        }
    }

    fn reject_unknown<'a>(&mut self, keys: impl Iterator<Item = &'a String>) {
        for key in keys {
            self.push(key.as_str(), "is not allowed");
        }
    }

    pub fn into_result<T>(self, value: T) -> Result<T, Violations> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

/// Body of `POST /participants`.
#[derive(Debug, Default, Deserialize)]
pub struct NewParticipant {
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
}

impl NewParticipant {
    pub fn validate(self) -> Result<Registration, Violations> {
        let mut violations = Violations::new();
        let name = violations.required("name", self.name);
        violations.reject_unknown(self.extra.keys());
        violations.into_result(Registration { name })
    }
}

/// Body of `POST /messages` and `PUT /messages/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct MessageBody {
    pub to: Option<String>,
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MessageBody {
    /// Builds the draft authored by `from`. Older clients send the kind as
    /// `kind` rather than `type`; both are accepted.
    pub fn validate(mut self, from: Option<String>) -> Result<MessageDraft, Violations> {
        let mut violations = Violations::new();

        let from = violations.required("user", from);
        let to = violations.required("to", self.to);
        let text = violations.required("text", self.text);

        let raw_kind = match self.kind {
            Some(kind) => Some(kind),
            None => match self.extra.remove("kind") {
                Some(Value::String(kind)) => Some(kind),
                Some(_) => {
                    violations.push("kind", "must be a string");
                    None
                }
                None => None,
            },
        };
        let kind = match raw_kind.as_deref() {
            None => MessageKind::Message,
            Some(raw) => MessageKind::from_user_input(raw).unwrap_or_else(|| {
                violations.push("type", "must be one of [message, private_message]");
                MessageKind::Message
            }),
        };

        violations.reject_unknown(
            self.extra
                .keys()
                .filter(|key| !IGNORED_MESSAGE_KEYS.contains(&key.as_str())),
        );

        violations.into_result(MessageDraft { from, to, text, kind })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn body(value: Value) -> MessageBody {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn missing_name_is_reported() {
        let participant: NewParticipant = serde_json::from_value(json!({})).unwrap();
        let err = participant.validate().unwrap_err();
        assert_eq!(err.messages(), vec!["\"name\" is required".to_string()]);
    }

    #[test]
    fn blank_name_and_unknown_keys_are_reported_together() {
        let participant: NewParticipant =
            serde_json::from_value(json!({ "name": "  ", "age": 3 })).unwrap();
        let err = participant.validate().unwrap_err();
        assert_eq!(
            err.messages(),
            vec![
                "\"name\" is not allowed to be empty".to_string(),
                "\"age\" is not allowed".to_string(),
            ]
        );
    }

    #[test]
    fn message_kind_defaults_to_broadcast() {
        let draft = body(json!({ "to": "Todos", "text": "oi" }))
            .validate(Some("Alice".into()))
            .unwrap();
        assert_eq!(draft.kind, MessageKind::Message);
        assert_eq!(draft.from, "Alice");
    }

    #[test]
    fn kind_alias_is_accepted() {
        let draft = body(json!({ "to": "Bob", "text": "psst", "kind": "private_message" }))
            .validate(Some("Alice".into()))
            .unwrap();
        assert_eq!(draft.kind, MessageKind::PrivateMessage);
    }

    #[test]
    fn users_cannot_post_status_messages() {
        let err = body(json!({ "to": "Todos", "text": "sai da sala...", "type": "status" }))
            .validate(Some("Alice".into()))
            .unwrap_err();
        assert_eq!(
            err.messages(),
            vec!["\"type\" must be one of [message, private_message]".to_string()]
        );
    }

    #[test]
    fn every_violation_is_collected() {
        let err = body(json!({ "text": "", "color": "red", "from": "Mallory" }))
            .validate(None)
            .unwrap_err();
        let fields: Vec<_> = err.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["user", "to", "text", "color"]);
    }
}
