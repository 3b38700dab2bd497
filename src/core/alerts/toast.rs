// Transient notifications raised alongside new alerts.
//
// Toasts stack without deduplication and expire on their own. Removing a
// toast never touches the alert store.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::core::model::{Alert, AlertId, Category};

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ToastId(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: ToastId,
    pub alert_id: AlertId,
    pub category: Category,
    pub icon: &'static str,
    pub title: String,
    pub message: String,
    pub expires_at: Instant,
}

pub struct ToastPresenter {
    /// Oldest first, i.e. stack order
    toasts: Vec<Toast>,
    duration: Duration,
    next_id: u64,
}

impl ToastPresenter {
    pub fn new(duration: Duration) -> Self {
        Self {
            toasts: Vec::new(),
            duration,
            next_id: 0,
        }
    }

    pub fn present(&mut self, alert: &Alert, now: Instant) -> ToastId {
        self.next_id += 1;
        let id = ToastId(self.next_id);
        log::debug!("toast {:?} for {}: {}", id, alert.id(), alert.title());
        self.toasts.push(Toast {
            id,
            alert_id: alert.id(),
            category: alert.category(),
            icon: alert.category().icon(),
            title: alert.title().to_string(),
            message: alert.description().to_string(),
            expires_at: now + self.duration,
        });
        id
    }

    /// Close a toast before it expires. Returns false if it is already gone.
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    /// Remove and return every toast whose lifetime has elapsed at `now`.
    pub fn expire(&mut self, now: Instant) -> Vec<Toast> {
        let (expired, live): (Vec<Toast>, Vec<Toast>) = self
            .toasts
            .drain(..)
            .partition(|t| t.expires_at <= now);
        self.toasts = live;
        expired
    }

    pub fn active(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Default for ToastPresenter {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}
