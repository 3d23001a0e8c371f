use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, trace, warn};

/// How long a notification stays up when nobody dismisses it.
pub const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

/// Single-slot toast holder.
///
/// Showing a notification replaces the current one. Each notification clears
/// itself after the timeout; a newer notification is never cleared by the
/// timer of an older one.
#[derive(Clone)]
pub struct Notifier {
    slot: Arc<Mutex<Option<Notification>>>,
    next_id: Arc<AtomicU64>,
    timeout: Duration,
}

impl Notifier {
    pub fn new(timeout: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            next_id: Arc::new(AtomicU64::new(0)),
            timeout,
        }
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.show(NotificationKind::Success, message.into())
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.show(NotificationKind::Error, message.into())
    }

    fn show(&self, kind: NotificationKind, message: String) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(id, ?kind, "Showing notification: {}", message);

        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(Notification {
            id,
            kind,
            message,
        });

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let slot = Arc::clone(&self.slot);
                let timeout = self.timeout;
                handle.spawn(async move {
                    tokio::time::sleep(timeout).await;
                    let mut current = slot.lock().unwrap_or_else(PoisonError::into_inner);
                    if current.as_ref().is_some_and(|n| n.id == id) {
                        trace!(id, "Notification expired");
                        *current = None;
                    }
                });
            }
            Err(_) => warn!(id, "No async runtime available; notification will not auto-clear"),
        }

        id
    }

    pub fn current(&self) -> Option<Notification> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn dismiss(&self) {
        let mut current = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(notification) = current.take() {
            trace!(id = notification.id, "Notification dismissed");
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TIMEOUT)
    }
}
