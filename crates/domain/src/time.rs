//! Timestamps attached to provisioning reports.

use chrono::{DateTime, Utc};

/// UTC instant, used for `started_at` / `finished_at`.
pub type Timestamp = DateTime<Utc>;

/// Current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_not_go_backwards_between_calls() {
        let first = now();
        let second = now();
        assert!(second >= first);
    }
}
