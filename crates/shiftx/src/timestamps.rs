//! ⏰ Timestamp normalizer. Epoch millis go in, calendar timestamps come out, nobody panics.

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

/// 🔄 Turns an epoch-milliseconds JSON value into a UTC calendar timestamp.
///
/// Only integers strictly greater than zero qualify. Floats, strings, bools, nulls, zero and
/// negatives all come back as `None`. Milliseconds survive the trip because the KPI duration
/// math needs them (a break of 23m05.277s is not a break of 23m05s, the accountants noticed).
pub fn from_epoch_millis(value: &Value) -> Option<NaiveDateTime> {
    let millis = value.as_i64().filter(|ms| *ms > 0)?;
    DateTime::from_timestamp_millis(millis).map(|utc| utc.naive_utc())
}
