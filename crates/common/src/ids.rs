//! Identity and timestamp sources
//!
//! Stores never read the system clock directly. They go through an
//! [`IdGenerator`] and a [`Clock`] handed in with their options, so tests can
//! swap in deterministic implementations.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Produces resource ids of the form `<prefix>-<suffix>`
pub trait IdGenerator: Send + Sync {
    fn next_id(&self, prefix: &str) -> String;
}

/// Epoch-millisecond ids, e.g. `db-1702658472001`
///
/// Monotonic within the process: a call landing in the same millisecond as
/// the previous one (or after a clock step backwards) gets `last + 1`.
#[derive(Debug, Default)]
pub struct EpochMillisIds {
    last: AtomicU64,
}

impl EpochMillisIds {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_millis(&self) -> u64 {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(prev + 1)
    }
}

impl IdGenerator for EpochMillisIds {
    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_millis())
    }
}

/// Random v4 UUID ids
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, Uuid::new_v4())
    }
}

/// Counter ids starting at 1: `vm-1`, `vm-2`, ...
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next.fetch_add(1, Ordering::SeqCst))
    }
}

/// Source of creation timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_epoch_millis_ids_are_unique_within_a_millisecond() {
        let ids = EpochMillisIds::new();
        let issued: HashSet<String> = (0..1000).map(|_| ids.next_id("db")).collect();
        assert_eq!(issued.len(), 1000);
    }

    #[test]
    fn test_epoch_millis_ids_format() {
        let before = Utc::now().timestamp_millis() as u64;
        let id = EpochMillisIds::new().next_id("pip");

        let suffix = id.strip_prefix("pip-").unwrap();
        let millis: u64 = suffix.parse().unwrap();
        assert!(millis >= before);
    }

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIds::new();
        assert_eq!(ids.next_id("vm"), "vm-1");
        assert_eq!(ids.next_id("vm"), "vm-2");
        assert_eq!(ids.next_id("disk"), "disk-3");
    }

    #[test]
    fn test_uuid_ids() {
        let id = UuidIds.next_id("sa");
        let suffix = id.strip_prefix("sa-").unwrap();
        assert!(Uuid::parse_str(suffix).is_ok());
    }

    #[test]
    fn test_fixed_clock() {
        let at = DateTime::parse_from_rfc3339("2023-12-15T16:41:12Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(FixedClock(at).now(), at);
    }
}
