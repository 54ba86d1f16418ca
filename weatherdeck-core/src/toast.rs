//! Ephemeral user-facing notifications with per-toast expiry.

use std::{
    sync::{
        Arc, Mutex, MutexGuard, Weak,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    pub fn icon(&self) -> &'static str {
        match self {
            ToastKind::Success => "✓",
            ToastKind::Error => "✕",
            ToastKind::Warning => "⚠",
            ToastKind::Info => "ℹ",
        }
    }
}

pub type ToastId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub kind: ToastKind,
    /// Zero keeps the toast until it is dismissed.
    pub duration: Duration,
}

#[derive(Debug)]
struct Entry {
    toast: Toast,
    timer: Option<JoinHandle<()>>,
}

#[derive(Debug)]
struct Inner {
    entries: Mutex<Vec<Entry>>,
    next_id: AtomicU64,
    events: broadcast::Sender<Toast>,
}

impl Inner {
    fn entries(&self) -> MutexGuard<'_, Vec<Entry>> {
        // a poisoned list is still a valid list
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn take(&self, id: ToastId) -> Option<Entry> {
        let mut entries = self.entries();
        let pos = entries.iter().position(|e| e.toast.id == id)?;
        Some(entries.remove(pos))
    }
}

/// Shared handle to the toast feed. Clones refer to the same feed.
#[derive(Debug, Clone)]
pub struct ToastManager {
    inner: Arc<Inner>,
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastManager {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                events,
            }),
        }
    }

    /// Receive every toast added from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.inner.events.subscribe()
    }

    /// Show a toast and schedule its expiry. Returns its id.
    pub fn add(&self, message: impl Into<String>, kind: ToastKind, duration: Duration) -> ToastId {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let toast = Toast {
            id,
            message: message.into(),
            kind,
            duration,
        };
        debug!(id, ?kind, message = %toast.message, "toast");

        self.inner.entries().push(Entry {
            toast: toast.clone(),
            timer: None,
        });

        if !duration.is_zero() {
            if let Some(timer) = self.schedule_expiry(id, duration) {
                let mut entries = self.inner.entries();
                match entries.iter_mut().find(|e| e.toast.id == id) {
                    Some(entry) => entry.timer = Some(timer),
                    None => timer.abort(),
                }
            }
        }

        // nobody listening is fine
        let _ = self.inner.events.send(toast);

        id
    }

    fn schedule_expiry(&self, id: ToastId, duration: Duration) -> Option<JoinHandle<()>> {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(id, "no async runtime, toast will not expire on its own");
            return None;
        };

        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        Some(handle.spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(inner) = inner.upgrade() {
                inner.take(id);
            }
        }))
    }

    pub fn show_success(&self, message: impl Into<String>, duration: Duration) -> ToastId {
        self.add(message, ToastKind::Success, duration)
    }

    pub fn show_error(&self, message: impl Into<String>, duration: Duration) -> ToastId {
        self.add(message, ToastKind::Error, duration)
    }

    pub fn show_warning(&self, message: impl Into<String>, duration: Duration) -> ToastId {
        self.add(message, ToastKind::Warning, duration)
    }

    pub fn show_info(&self, message: impl Into<String>, duration: Duration) -> ToastId {
        self.add(message, ToastKind::Info, duration)
    }

    /// Dismiss a toast early. Returns false if it was already gone.
    pub fn remove(&self, id: ToastId) -> bool {
        match self.inner.take(id) {
            Some(entry) => {
                if let Some(timer) = entry.timer {
                    timer.abort();
                }
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        let drained: Vec<Entry> = self.inner.entries().drain(..).collect();
        for timer in drained.into_iter().filter_map(|e| e.timer) {
            timer.abort();
        }
    }

    /// Toasts currently on screen, oldest first.
    pub fn toasts(&self) -> Vec<Toast> {
        self.inner
            .entries()
            .iter()
            .map(|e| e.toast.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(manager: &ToastManager) -> Vec<String> {
        manager.toasts().into_iter().map(|t| t.message).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn toast_expires_after_duration() {
        let manager = ToastManager::new();
        manager.show_info("short", Duration::from_millis(2000));
        manager.show_error("long", Duration::from_millis(5000));

        assert_eq!(messages(&manager), vec!["short", "long"]);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(messages(&manager), vec!["long"]);

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert!(manager.toasts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn early_removal_is_idempotent() {
        let manager = ToastManager::new();
        let id = manager.show_warning("bye", Duration::from_millis(1000));

        assert!(manager.remove(id));
        assert!(!manager.remove(id));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(manager.toasts().is_empty());
        assert!(!manager.remove(id));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_is_sticky() {
        let manager = ToastManager::new();
        manager.show_success("sticky", Duration::ZERO);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(messages(&manager), vec!["sticky"]);

        manager.clear();
        assert!(manager.toasts().is_empty());
    }

    #[tokio::test]
    async fn ids_are_unique_and_kinds_kept() {
        let manager = ToastManager::new();
        let a = manager.show_success("a", Duration::from_secs(3));
        let b = manager.show_error("b", Duration::from_secs(3));
        assert_ne!(a, b);

        let kinds: Vec<_> = manager.toasts().iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![ToastKind::Success, ToastKind::Error]);
    }

    #[tokio::test]
    async fn subscribers_see_new_toasts() {
        let manager = ToastManager::new();
        let mut rx = manager.subscribe();

        manager.show_info("hello", Duration::from_secs(2));
        let toast = rx.recv().await.unwrap();
        assert_eq!(toast.message, "hello");
        assert_eq!(toast.kind, ToastKind::Info);
    }

    #[test]
    fn without_runtime_toasts_stay() {
        let manager = ToastManager::new();
        manager.show_info("no runtime", Duration::from_secs(1));
        assert_eq!(manager.toasts().len(), 1);
    }
}
