//! ID and timestamp utilities for qadesk
//!
//! Entity ids are random UUIDs; timestamps are UTC and serialize as RFC 3339.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Generate an opaque unique entity id
///
/// Example: `3f2b8c1e-5d4a-4f7e-9b1c-2a6d8e0f4c3b`
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Timestamp for a mutation of a record last touched at `previous`.
///
/// Always strictly later than `previous`, even when the clock has not moved
/// (or moved backwards) since the last write.
pub fn touch(previous: DateTime<Utc>) -> DateTime<Utc> {
    let current = now();
    if current > previous {
        current
    } else {
        previous + Duration::microseconds(1)
    }
}
