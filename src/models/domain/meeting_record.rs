use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::parse_timestamp_value;

/// Field names checked, in order, for a meeting record's timestamp.
pub const MEETING_TIMESTAMP_FIELDS: [&str; 6] = [
    "created_at",
    "createdAt",
    "timestamp",
    "date",
    "scheduled_at",
    "start_time",
];

/// A meeting entry sharing storage with the results cache. Only its age is
/// inspected; the payload is kept verbatim.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct MeetingRecord(pub Value);

impl MeetingRecord {
    /// First populated timestamp among [`MEETING_TIMESTAMP_FIELDS`].
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        MEETING_TIMESTAMP_FIELDS
            .iter()
            .filter_map(|field| self.0.get(field))
            .find(|value| !value.is_null() && value.as_str() != Some(""))
            .and_then(parse_timestamp_value)
    }
}
