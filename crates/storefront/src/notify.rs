//! User-facing notifications ("toasts").
//!
//! Cart operations never return failures to their caller; they report them
//! through a [`Notifier`] instead. [`ToastQueue`] buffers notifications until
//! the SPA drains them via `GET /notifications`.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

/// Oldest toasts are dropped once this many are pending.
const MAX_PENDING_TOASTS: usize = 50;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
}

/// A message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    /// Create an error notification.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Sink for user-facing notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Bounded FIFO of pending toasts.
#[derive(Debug, Default)]
pub struct ToastQueue {
    pending: Mutex<VecDeque<Notification>>,
}

impl ToastQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every pending toast, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    /// Number of pending toasts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, notification: Notification) {
        tracing::info!(
            severity = ?notification.severity,
            message = %notification.message,
            "Queued toast"
        );

        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if pending.len() >= MAX_PENDING_TOASTS {
            pending.pop_front();
        }
        pending.push_back(notification);
    }
}
