//! NotificationCenter - shared owner of the notification ledger.
//!
//! Wraps the ledger in a lock so it can be mutated from router dispatch
//! and read by any number of UI observers. Each mutation holds the write
//! lock for its whole duration, so handlers touching the ledger during the
//! same dispatch cannot interleave half-applied updates.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::domain::connection::{RealtimeEvent, LEDGER_EVENT_TYPES};
use crate::domain::foundation::{DomainError, NotificationId};
use crate::domain::notification::{Notification, NotificationLedger};
use crate::ports::{EventHandler, EventSubscriber};

/// Lock-guarded ledger plus an unread-count feed for badges.
pub struct NotificationCenter {
    ledger: RwLock<NotificationLedger>,
    unread_tx: watch::Sender<usize>,
}

impl NotificationCenter {
    pub fn new(retention_cap: usize) -> Self {
        let (unread_tx, _) = watch::channel(0);
        Self {
            ledger: RwLock::new(NotificationLedger::new(retention_cap)),
            unread_tx,
        }
    }

    /// Create as an Arc (for sharing with the router).
    pub fn new_shared(retention_cap: usize) -> Arc<Self> {
        Arc::new(Self::new(retention_cap))
    }

    /// Subscribes this center to the ledger-relevant event names.
    pub fn register(self: &Arc<Self>, subscriber: &impl EventSubscriber) {
        subscriber.subscribe_all(LEDGER_EVENT_TYPES, self.clone());
    }

    pub fn insert(&self, notification: Notification) {
        self.mutate(|ledger| ledger.insert(notification));
    }

    pub fn mark_read(&self, id: NotificationId) -> bool {
        self.mutate(|ledger| ledger.mark_read(id))
    }

    pub fn mark_all_read(&self) -> usize {
        self.mutate(|ledger| ledger.mark_all_read())
    }

    pub fn clear(&self) {
        self.mutate(|ledger| ledger.clear());
    }

    /// Replaces contents with a newest-first history snapshot.
    pub fn seed(&self, history: Vec<Notification>) {
        self.mutate(|ledger| ledger.seed(history));
    }

    /// Loads a REST history snapshot while keeping live entries that
    /// arrived after it was taken. Returns the number of history entries.
    pub fn merge_history(&self, history: Vec<Notification>) -> usize {
        self.mutate(|ledger| {
            let newest = history.first().map(|n| n.sent_at.clone());
            let live: Vec<Notification> = ledger
                .iter()
                .filter(|n| !history.iter().any(|h| h.id == n.id))
                .filter(|n| newest.as_ref().map_or(true, |t| t.is_before(&n.sent_at)))
                .cloned()
                .collect();

            let loaded = history.len();
            ledger.seed(history);
            for notification in live.into_iter().rev() {
                ledger.insert(notification);
            }
            loaded
        })
    }

    pub fn unread_count(&self) -> usize {
        self.ledger.read().unread_count()
    }

    pub fn len(&self) -> usize {
        self.ledger.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.read().is_empty()
    }

    pub fn get(&self, id: NotificationId) -> Option<Notification> {
        self.ledger.read().get(id).cloned()
    }

    /// Unread entries, newest-first.
    pub fn unread(&self) -> Vec<Notification> {
        self.ledger.read().unread()
    }

    /// Newest-first copy of the ledger.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.ledger.read().snapshot()
    }

    /// Reactive unread count.
    pub fn watch_unread(&self) -> watch::Receiver<usize> {
        self.unread_tx.subscribe()
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut NotificationLedger) -> R) -> R {
        let mut ledger = self.ledger.write();
        let result = f(&mut ledger);
        self.unread_tx.send_if_modified(|count| {
            let unread = ledger.unread_count();
            let changed = *count != unread;
            *count = unread;
            changed
        });
        result
    }
}

impl EventHandler for NotificationCenter {
    fn handle(&self, event: &RealtimeEvent) -> Result<(), DomainError> {
        match event {
            RealtimeEvent::NewNotification(notification) => {
                tracing::debug!(
                    notification_id = %notification.id,
                    kind = notification.notification_type.as_str(),
                    "Recording notification"
                );
                self.insert(notification.clone());
            }
            RealtimeEvent::NotificationRead(id) => {
                self.mark_read(*id);
            }
            RealtimeEvent::AllNotificationsRead => {
                self.mark_all_read();
            }
            _ => {}
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "NotificationCenter"
    }
}
