//! Short-lived "send me the image next" windows.
//!
//! A window is keyed by (conversation, user) and holds an absolute expiry.
//! Nothing is persisted and nothing sweeps in the background: an expired window
//! is discarded the next time it is checked.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// Who a window belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AwaitKey {
    pub conversation: String,
    pub user: String,
}

impl AwaitKey {
    pub fn new(conversation: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            conversation: conversation.into(),
            user: user.into(),
        }
    }
}

/// Outcome of checking a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwaitStatus {
    /// Window open. The entry stays until consumed or expired.
    StillWaiting,
    /// Window was open but has run out. The entry has been removed.
    Expired,
    /// No window for this key.
    NotWaiting,
}

#[derive(Debug, Default)]
pub struct AwaitState {
    windows: DashMap<AwaitKey, DateTime<Utc>>,
}

impl AwaitState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (or restart) a window lasting `ttl` from now.
    pub fn start_waiting(&self, key: AwaitKey, ttl: Duration) -> DateTime<Utc> {
        self.start_waiting_at(key, ttl, Utc::now())
    }

    pub fn start_waiting_at(&self, key: AwaitKey, ttl: Duration, now: DateTime<Utc>) -> DateTime<Utc> {
        let expiry = now + ttl;
        self.windows.insert(key, expiry);
        expiry
    }

    /// Check a key against the current time.
    pub fn check(&self, key: &AwaitKey) -> AwaitStatus {
        self.check_at(key, Utc::now())
    }

    /// Check a key against `now`. An expired entry is removed as a side effect.
    pub fn check_at(&self, key: &AwaitKey, now: DateTime<Utc>) -> AwaitStatus {
        if self.windows.remove_if(key, |_, expiry| now > *expiry).is_some() {
            return AwaitStatus::Expired;
        }
        if self.windows.contains_key(key) {
            AwaitStatus::StillWaiting
        } else {
            AwaitStatus::NotWaiting
        }
    }

    /// Close the window after a successful capture. Returns whether one was open.
    pub fn consume(&self, key: &AwaitKey) -> bool {
        self.windows.remove(key).is_some()
    }

    /// Number of windows held, expired or not.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
