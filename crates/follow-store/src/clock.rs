//! Strictly increasing insert timestamps, stored at microsecond precision.

use chrono::{DateTime, TimeZone, Utc};

#[derive(Debug, Default)]
pub(crate) struct MonotonicClock {
    last_micros: Option<i64>,
}

impl MonotonicClock {
    /// Current time in microseconds, bumped past the previous reading when the wall clock
    /// stalls or steps backwards.
    pub(crate) fn next_micros(&mut self) -> i64 {
        let now = Utc::now().timestamp_micros();
        let next = match self.last_micros {
            Some(last) if now <= last => last + 1,
            _ => now,
        };
        self.last_micros = Some(next);
        next
    }

    /// Seed from a persisted maximum so a reopened store keeps increasing.
    pub(crate) fn observe(&mut self, micros: i64) {
        match self.last_micros {
            Some(last) if last >= micros => {}
            _ => self.last_micros = Some(micros),
        }
    }
}

pub(crate) fn micros_to_datetime(micros: i64) -> DateTime<Utc> {
    Utc.timestamp_micros(micros).single().unwrap_or(DateTime::<Utc>::MIN_UTC)
}
