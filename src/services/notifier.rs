//! Toast notifications shown to the user

use serde::{Deserialize, Serialize};
use tracing::info;

/// Screen corner a toast is shown in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToastPosition {
    TopRight,
    TopCenter,
    BottomRight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub message: String,
    pub duration_ms: u64,
    pub position: ToastPosition,
}

impl Notification {
    pub fn toast(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            duration_ms: 3000,
            position: ToastPosition::TopRight,
        }
    }
}

/// Fire-and-forget notification sink
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier that writes toasts to the service log
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        info!("Notification: {}", notification.message);
    }
}
