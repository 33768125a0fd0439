//! Abstractions for time and client storage to enable testing.
//!
//! This module provides traits for:
//! - `Clock`: Abstracting time access for deterministic testing
//! - `VisitStorage`: Abstracting the single durable slot that holds visit counts

use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};

// ==================== Clock Trait ====================

/// Trait for abstracting time access.
///
/// The business timezone is applied on top of this by
/// [`BusinessClock`](crate::schedule::BusinessClock), so implementations only
/// need to report the current instant.
pub trait Clock: Send + Sync {
    /// Get the current time in UTC.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// System clock implementation using real time.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Mock clock for testing with controllable time.
#[derive(Debug, Clone)]
pub struct MockClock {
    utc_time: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    /// Create a new mock clock set to the given UTC time.
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            utc_time: Arc::new(Mutex::new(time)),
        }
    }

    /// Set the mock clock to a new time.
    pub fn set_time(&self, time: DateTime<Utc>) {
        *self.utc_time.lock().unwrap() = time;
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: chrono::Duration) {
        let mut time = self.utc_time.lock().unwrap();
        *time = *time + duration;
    }
}

impl Clock for MockClock {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.utc_time.lock().unwrap()
    }
}

// ==================== Storage Trait ====================

/// A single named slot of client-local storage.
///
/// The slot is always read and written as a whole; there are no partial
/// updates.
pub trait VisitStorage {
    /// Read the slot. `Ok(None)` means nothing has been stored yet.
    fn load(&self) -> Result<Option<String>>;

    /// Replace the slot contents.
    fn save(&self, contents: &str) -> Result<()>;
}

impl<S: VisitStorage + ?Sized> VisitStorage for &S {
    fn load(&self) -> Result<Option<String>> {
        (**self).load()
    }

    fn save(&self, contents: &str) -> Result<()> {
        (**self).save(contents)
    }
}

/// In-memory storage for tests.
///
/// Clones share the same slot, so a test can keep a handle and inspect what
/// a [`VisitCounter`](crate::visits::VisitCounter) wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
    unavailable: bool,
}

impl MemoryStorage {
    /// Create an empty storage slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage slot that already holds `contents`.
    pub fn with_contents(contents: &str) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(contents.to_string()))),
            unavailable: false,
        }
    }

    /// Create a storage backend whose every call fails.
    pub fn unavailable() -> Self {
        Self {
            slot: Arc::default(),
            unavailable: true,
        }
    }

    /// Get the raw slot contents.
    pub fn contents(&self) -> Option<String> {
        self.slot.lock().unwrap().clone()
    }
}

impl VisitStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>> {
        if self.unavailable {
            bail!("storage unavailable");
        }
        Ok(self.slot.lock().unwrap().clone())
    }

    fn save(&self, contents: &str) -> Result<()> {
        if self.unavailable {
            bail!("storage unavailable");
        }
        *self.slot.lock().unwrap() = Some(contents.to_string());
        Ok(())
    }
}
