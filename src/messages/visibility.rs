//! Per-viewer view of the shared message log.

use super::{Message, MessageKind};

/// Public and status messages are seen by everyone; a private message only by
/// its author and its recipient. An anonymous viewer sees no private messages.
pub fn is_visible(message: &Message, viewer: Option<&str>) -> bool {
    match message.kind {
        MessageKind::Message | MessageKind::Status => true,
        MessageKind::PrivateMessage => {
            viewer.is_some_and(|viewer| viewer == message.from || viewer == message.to)
        }
    }
}

/// Filters `log` for `viewer`, then keeps the `limit` most recent survivors.
/// The result stays oldest-first.
pub fn feed(log: Vec<Message>, viewer: Option<&str>, limit: Option<usize>) -> Vec<Message> {
    let mut visible: Vec<Message> = log
        .into_iter()
        .filter(|message| is_visible(message, viewer))
        .collect();

    if let Some(limit) = limit {
        let excess = visible.len().saturating_sub(limit);
        visible.drain(..excess);
    }
    visible
}

/// `?limit=` as sent by clients. Zero, negative, and non-numeric values mean
/// no limit.
pub fn parse_limit(raw: Option<&str>) -> Option<usize> {
    raw?.trim()
        .parse::<i64>()
        .ok()
        .filter(|limit| *limit > 0)
        .and_then(|limit| usize::try_from(limit).ok())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::messages::BROADCAST;

    const NAMES: &[&str] = &["Alice", "Bob", "Carol"];

    fn message(n: usize, from: &str, to: &str, kind: MessageKind) -> Message {
        Message {
            id: n.to_string(),
            from: from.to_owned(),
            to: to.to_owned(),
            text: format!("message {n}"),
            kind,
            time: "12:00:00".to_owned(),
        }
    }

    fn ids(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.id.as_str()).collect()
    }

    fn arb_log() -> impl Strategy<Value = Vec<Message>> {
        let kind = prop_oneof![
            Just(MessageKind::Message),
            Just(MessageKind::PrivateMessage),
            Just(MessageKind::Status),
        ];
        prop::collection::vec((0..NAMES.len(), 0..=NAMES.len(), kind), 0..40).prop_map(|entries| {
            entries
                .into_iter()
                .enumerate()
                .map(|(n, (from, to, kind))| {
                    let to = NAMES.get(to).copied().unwrap_or(BROADCAST);
                    message(n, NAMES[from], to, kind)
                })
                .collect()
        })
    }

    fn arb_viewer() -> impl Strategy<Value = Option<String>> {
        prop::option::of(prop::sample::select(NAMES).prop_map(str::to_owned))
    }

    #[test]
    fn private_message_reaches_only_its_parties() {
        let log = vec![
            message(1, "Alice", BROADCAST, MessageKind::Status),
            message(2, "Alice", "Bob", MessageKind::PrivateMessage),
            message(3, "Carol", BROADCAST, MessageKind::Message),
        ];

        assert_eq!(ids(&feed(log.clone(), Some("Bob"), None)), vec!["1", "2", "3"]);
        assert_eq!(ids(&feed(log.clone(), Some("Alice"), None)), vec!["1", "2", "3"]);
        assert_eq!(ids(&feed(log.clone(), Some("Carol"), None)), vec!["1", "3"]);
        assert_eq!(ids(&feed(log, None, None)), vec!["1", "3"]);
    }

    #[test]
    fn limit_applies_after_filtering() {
        let log = vec![
            message(1, "Alice", BROADCAST, MessageKind::Message),
            message(2, "Bob", BROADCAST, MessageKind::Message),
            message(3, "Alice", "Bob", MessageKind::PrivateMessage),
            message(4, "Bob", "Alice", MessageKind::PrivateMessage),
        ];

        // Carol can't see 3 or 4, so her two most recent are 1 and 2
        assert_eq!(ids(&feed(log.clone(), Some("Carol"), Some(2))), vec!["1", "2"]);
        assert_eq!(ids(&feed(log.clone(), Some("Bob"), Some(2))), vec!["3", "4"]);
        assert_eq!(ids(&feed(log, Some("Bob"), Some(10))).len(), 4);
    }

    #[test]
    fn limit_parsing() {
        assert_eq!(parse_limit(Some("3")), Some(3));
        assert_eq!(parse_limit(Some(" 50 ")), Some(50));
        assert_eq!(parse_limit(Some("0")), None);
        assert_eq!(parse_limit(Some("-4")), None);
        assert_eq!(parse_limit(Some("ten")), None);
        assert_eq!(parse_limit(Some("")), None);
        assert_eq!(parse_limit(None), None);
    }

    proptest! {
        #[test]
        fn feed_never_leaks_private_messages(log in arb_log(), viewer in arb_viewer()) {
            for message in feed(log, viewer.as_deref(), None) {
                prop_assert!(
                    message.kind != MessageKind::PrivateMessage
                        || viewer.as_deref() == Some(message.from.as_str())
                        || viewer.as_deref() == Some(message.to.as_str())
                );
            }
        }

        #[test]
        fn limited_feed_is_tail_of_full_feed(
            log in arb_log(),
            viewer in arb_viewer(),
            limit in 1usize..50,
        ) {
            let full = feed(log.clone(), viewer.as_deref(), None);
            let limited = feed(log, viewer.as_deref(), Some(limit));
            let tail = &full[full.len().saturating_sub(limit)..];
            prop_assert_eq!(limited.as_slice(), tail);
        }
    }
}
