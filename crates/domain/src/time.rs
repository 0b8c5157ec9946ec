//! Time and timestamp helpers.

use chrono::{DateTime, SecondsFormat, Utc};

/// UTC timestamp used for event times and schedule changes.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Render a timestamp the way it appears in entity attributes.
#[must_use]
pub fn to_attribute_string(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}
