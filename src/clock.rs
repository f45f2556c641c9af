use time::{format_description::BorrowedFormatItem, macros::format_description, OffsetDateTime};

const LABEL: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]:[second]");

pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

pub fn unix_millis(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

/// `HH:MM:SS`, as shown next to each message.
pub fn label(at: OffsetDateTime) -> String {
    at.format(LABEL).unwrap_or_default()
}
