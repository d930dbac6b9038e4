//! Time and identity sources injected into the engine.
//!
//! The workflow value itself never reads ambient time or generates ids, so
//! every operation stays deterministic under test.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

use crate::history::recorded_at;

/// Source of timestamps for history entries.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall clock, truncated to whole milliseconds.
///
/// History timestamps are persisted as ISO-8601 with millisecond precision,
/// so truncating here keeps decoded workflows equal to the encoded ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    recorded_at(Utc::now())
  }
}

/// A clock that always reports the same instant until moved.
#[derive(Debug)]
pub struct FixedClock {
  now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
  pub fn new(now: DateTime<Utc>) -> Self {
    Self {
      now: Mutex::new(now),
    }
  }

  /// Move the clock to `now`.
  pub fn set(&self, now: DateTime<Utc>) {
    if let Ok(mut guard) = self.now.lock() {
      *guard = now;
    }
  }
}

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> {
    match self.now.lock() {
      Ok(guard) => *guard,
      Err(poisoned) => *poisoned.into_inner(),
    }
  }
}

/// Source of ids for states and transitions created without one.
pub trait IdGenerator: Send + Sync {
  fn generate(&self) -> String;
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
  fn generate(&self) -> String {
    uuid::Uuid::new_v4().to_string()
  }
}

/// `{prefix}-1`, `{prefix}-2`, ...
#[derive(Debug)]
pub struct SequentialIds {
  prefix: String,
  next: AtomicU64,
}

impl SequentialIds {
  pub fn new(prefix: impl Into<String>) -> Self {
    Self {
      prefix: prefix.into(),
      next: AtomicU64::new(1),
    }
  }
}

impl IdGenerator for SequentialIds {
  fn generate(&self) -> String {
    let n = self.next.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", self.prefix, n)
  }
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Timelike};

  use super::*;

  #[test]
  fn test_system_clock_has_millisecond_precision() {
    let now = SystemClock.now();
    assert_eq!(now.nanosecond() % 1_000_000, 0);
  }

  #[test]
  fn test_fixed_clock_moves_only_when_set() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let later = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let clock = FixedClock::new(start);

    assert_eq!(clock.now(), start);
    assert_eq!(clock.now(), start);
    clock.set(later);
    assert_eq!(clock.now(), later);
  }

  #[test]
  fn test_sequential_ids() {
    let ids = SequentialIds::new("state");
    assert_eq!(ids.generate(), "state-1");
    assert_eq!(ids.generate(), "state-2");
  }

  #[test]
  fn test_uuid_ids_are_unique() {
    assert_ne!(UuidGenerator.generate(), UuidGenerator.generate());
  }
}
