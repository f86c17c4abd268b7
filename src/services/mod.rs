//! External collaborators module
//!
//! This module contains the backend REST client and the fire-and-forget
//! notification and sound sinks used when a countdown completes.

pub mod backend;
pub mod notifier;
pub mod sound;

// Re-export main types
pub use backend::{HttpBackend, StudyBackend};
pub use notifier::{LogNotifier, Notification, Notifier, ToastPosition};
pub use sound::{CommandSoundPlayer, SilentPlayer, SoundPlayer};
