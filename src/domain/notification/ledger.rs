//! NotificationLedger - bounded, newest-first record of received notifications.
//!
//! The ledger is the client's authoritative view of notification history
//! and unread state. It is a plain value: callers that share it across
//! event handlers wrap it in a lock (see `application::NotificationCenter`).
//!
//! # Invariants
//!
//! - `len() <= cap()`; inserting past the cap discards the oldest entries.
//! - Ids are unique; re-inserting an id replaces the old entry.
//! - `unread_count()` equals the number of entries with `is_read == false`
//!   after every mutation.

use std::collections::VecDeque;

use super::Notification;
use crate::domain::foundation::NotificationId;

/// Retention cap observed in production.
pub const DEFAULT_RETENTION_CAP: usize = 100;

/// Bounded most-recent-first queue of notifications.
#[derive(Debug, Clone)]
pub struct NotificationLedger {
    entries: VecDeque<Notification>,
    cap: usize,
    unread_count: usize,
}

impl NotificationLedger {
    /// Creates an empty ledger holding at most `cap` entries.
    ///
    /// A cap of zero is raised to one.
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            entries: VecDeque::with_capacity(cap.min(DEFAULT_RETENTION_CAP)),
            cap,
            unread_count: 0,
        }
    }

    /// Prepends a notification, evicting from the tail past the cap.
    pub fn insert(&mut self, notification: Notification) {
        if let Some(pos) = self.position(notification.id) {
            if let Some(old) = self.entries.remove(pos) {
                if !old.is_read {
                    self.unread_count = self.unread_count.saturating_sub(1);
                }
            }
        }

        if !notification.is_read {
            self.unread_count += 1;
        }
        self.entries.push_front(notification);

        while self.entries.len() > self.cap {
            if let Some(evicted) = self.entries.pop_back() {
                if !evicted.is_read {
                    self.unread_count = self.unread_count.saturating_sub(1);
                }
            }
        }
    }

    /// Replaces the contents with a newest-first history snapshot.
    ///
    /// Entries beyond the cap are dropped from the old end.
    pub fn seed(&mut self, history: Vec<Notification>) {
        self.clear();
        for notification in history.into_iter().rev() {
            self.insert(notification);
        }
    }

    /// Marks one entry read. Returns true if it was unread.
    ///
    /// Missing ids are ignored; the entry may have left the retention window.
    pub fn mark_read(&mut self, id: NotificationId) -> bool {
        match self.entries.iter_mut().find(|n| n.id == id) {
            Some(entry) if !entry.is_read => {
                entry.is_read = true;
                self.unread_count = self.unread_count.saturating_sub(1);
                true
            }
            _ => false,
        }
    }

    /// Marks every entry read. Returns how many entries changed.
    pub fn mark_all_read(&mut self) -> usize {
        let changed = self.unread_count;
        for entry in self.entries.iter_mut() {
            entry.is_read = true;
        }
        self.unread_count = 0;
        changed
    }

    /// Empties the ledger locally. Nothing is deleted server-side.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.unread_count = 0;
    }

    pub fn unread_count(&self) -> usize {
        self.unread_count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Looks up an entry by id.
    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.entries.iter().find(|n| n.id == id)
    }

    /// Iterates newest-first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    /// Unread entries, newest-first.
    pub fn unread(&self) -> Vec<Notification> {
        self.entries.iter().filter(|n| !n.is_read).cloned().collect()
    }

    /// Owned copy of every entry, newest-first.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.entries.iter().cloned().collect()
    }

    fn position(&self, id: NotificationId) -> Option<usize> {
        self.entries.iter().position(|n| n.id == id)
    }
}

impl Default for NotificationLedger {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION_CAP)
    }
}
