//! Simple time helpers used by the load/store path and event logging.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Current timestamp in milliseconds since the Unix epoch.
pub fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// Milliseconds elapsed since `start`, on the monotonic clock.
pub fn elapsed_ms(start: Instant) -> u128 {
    start.elapsed().as_millis()
}
