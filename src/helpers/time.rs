use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn get_instant() -> Instant {
    Instant::now()
}

pub fn millis(timeout_ms: u64) -> Duration {
    Duration::from_millis(timeout_ms)
}
