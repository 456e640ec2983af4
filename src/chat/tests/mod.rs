//! Unit tests for the chat module.
//!
//! Tests are organised by concern: domain inputs, deadlines, referential
//! checks, and the in-memory backend.


use std::sync::Mutex;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

/// Clock that advances one second on every reading.
pub(super) struct SteppingClock {
    next: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    pub(super) fn starting_at(seconds: i64) -> Self {
        Self::starting_at_precise(seconds, 0)
    }

    pub(super) fn starting_at_precise(seconds: i64, nanos: u32) -> Self {
        let start = Utc
            .timestamp_opt(seconds, nanos)
            .single()
            .expect("valid start timestamp");
        Self {
            next: Mutex::new(start),
        }
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().expect("clock lock");
        let now = *next;
        *next = now + TimeDelta::seconds(1);
        now
    }
}
