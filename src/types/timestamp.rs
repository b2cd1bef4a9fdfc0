use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since epoch. `now()` never moves backward within a process,
/// so ledger entries appended by the same writer always carry
/// non-decreasing timestamps even across wall-clock anomalies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn now() -> Self {
        let wall_clock = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let pinned = LAST_MILLIS.fetch_max(wall_clock, Ordering::SeqCst).max(wall_clock);
        Timestamp(pinned)
    }

    pub fn from_millis(millis: u64) -> Self {
        Timestamp(millis)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.0 as i64)
            .single()
            .unwrap_or_default()
    }
}

static LAST_MILLIS: AtomicU64 = AtomicU64::new(0);

impl std::ops::Add<std::time::Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, duration: std::time::Duration) -> Timestamp {
        Timestamp(self.0 + duration.as_millis() as u64)
    }
}

impl std::ops::Sub for Timestamp {
    type Output = std::time::Duration;

    fn sub(self, other: Timestamp) -> std::time::Duration {
        std::time::Duration::from_millis(self.0.saturating_sub(other.0))
    }
}
