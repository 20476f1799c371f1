//! Readiness wait policy for eventually-consistent stores.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Bounded polling policy used by
/// [`ObjectStore::wait_until_object_exists`](super::ObjectStore::wait_until_object_exists).
///
/// Delays grow exponentially from `delay` up to `max_delay`, each with up to
/// 10% random jitter. Durations serialize as milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitPolicy {
    /// Number of lookups before giving up
    pub max_attempts: u32,
    /// Delay before the second lookup
    #[serde(with = "millis")]
    pub delay: Duration,
    /// Upper bound for a single delay
    #[serde(with = "millis")]
    pub max_delay: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl WaitPolicy {
    /// A policy that polls `max_attempts` times with a fixed `delay`.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            max_delay: delay,
        }
    }

    /// Delay to sleep after the given (1-based) failed attempt.
    pub(crate) fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let base = self
            .delay
            .checked_mul(1 << shift)
            .unwrap_or(self.max_delay)
            .min(self.max_delay.max(self.delay));

        let jitter_cap = base.as_millis() as u64 / 10;
        if jitter_cap == 0 {
            return base;
        }
        base + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_cap))
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_is_bounded() {
        let policy = WaitPolicy {
            max_attempts: 10,
            delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(400),
        };

        let first = policy.backoff(1);
        assert!(first >= Duration::from_millis(100) && first <= Duration::from_millis(110));

        let late = policy.backoff(8);
        assert!(late >= Duration::from_millis(400) && late <= Duration::from_millis(440));
    }

    #[test]
    fn test_fixed_policy() {
        let policy = WaitPolicy::fixed(3, Duration::from_millis(1));
        assert_eq!(policy.backoff(1), Duration::from_millis(1));
        assert_eq!(policy.backoff(3), Duration::from_millis(1));
    }

    #[test]
    fn test_serde_millis() {
        let policy = WaitPolicy::fixed(4, Duration::from_millis(250));
        let json = serde_json::to_string(&policy).unwrap();
        assert_eq!(json, r#"{"max_attempts":4,"delay":250,"max_delay":250}"#);

        let parsed: WaitPolicy = serde_json::from_str(r#"{"max_attempts":2}"#).unwrap();
        assert_eq!(parsed.max_attempts, 2);
        assert_eq!(parsed.delay, Duration::from_secs(5));
    }
}
