use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use std::fmt;

pub const INVALID_DATE: &str = "Invalid date";

/// Identifier of an observation as handed out by the agent. Upstream uses
/// both numeric and string keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    /// Unsigned ids past `i64::MAX`.
    UInt(u64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::UInt(id) => write!(f, "{}", id),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

/// Creation timestamp exactly as the agent sent it. Formatting is deferred
/// to display time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Text(String),
    EpochMillis(i64),
}

impl RawTimestamp {
    /// Calendar date of the timestamp, in its own offset for textual forms
    /// and in UTC for epoch values.
    pub fn to_date(&self) -> Option<NaiveDate> {
        match self {
            RawTimestamp::EpochMillis(ms) => {
                DateTime::<Utc>::from_timestamp_millis(*ms).map(|dt| dt.date_naive())
            }
            RawTimestamp::Text(text) => parse_date_text(text.trim()),
        }
    }

    pub fn raw(&self) -> String {
        match self {
            RawTimestamp::Text(text) => text.clone(),
            RawTimestamp::EpochMillis(ms) => ms.to_string(),
        }
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::<FixedOffset>::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationRecord {
    pub id: RecordId,
    pub common_name: String,
    pub scientific_name: String,
    pub location: String,
    pub image_url: Option<String>,
    pub created_at: Option<RawTimestamp>,
}

impl ObservationRecord {
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            common_name: String::new(),
            scientific_name: String::new(),
            location: String::new(),
            image_url: None,
            created_at: None,
        }
    }

    /// Display date such as `10 April 2024`, or [`INVALID_DATE`] when the
    /// stored timestamp is missing or unparseable.
    pub fn observed_on(&self) -> String {
        self.created_at
            .as_ref()
            .and_then(RawTimestamp::to_date)
            .map(|date| date.format("%d %B %Y").to_string())
            .unwrap_or_else(|| INVALID_DATE.to_string())
    }
}
