/// Transient toast notifications
///
/// Every user-visible failure and confirmation ends up here. A notice carries
/// its own expiry; callers pass the current instant so the list stays testable.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// One toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Success or error styling
    pub level: NoticeLevel,
    /// Text shown to the user
    pub message: String,
    /// Dismissed from this instant on
    pub expires_at: Instant,
}

/// Toasts in the order they were raised
#[derive(Debug, Default)]
pub struct Notices {
    items: Vec<Notice>,
}

impl Notices {
    /// Add a notice; anything already expired at `now` is dismissed
    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>, now: Instant, ttl: Duration) {
        self.prune(now);
        self.items.push(Notice {
            level,
            message: message.into(),
            expires_at: now + ttl,
        });
    }

    /// Notices still visible at `now`
    pub fn active(&self, now: Instant) -> impl Iterator<Item = &Notice> {
        self.items.iter().filter(move |n| n.expires_at > now)
    }

    /// Drop expired notices
    pub fn prune(&mut self, now: Instant) {
        self.items.retain(|n| n.expires_at > now);
    }

    /// Most recent notice still visible at `now`
    pub fn latest(&self, now: Instant) -> Option<&Notice> {
        self.items.iter().rev().find(|n| n.expires_at > now)
    }

    /// Stored notices, expired ones not yet pruned included
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
