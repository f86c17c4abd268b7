//! Completion sound playback

use std::{path::Path, process::Stdio};

use async_trait::async_trait;
use tokio::process::Command;

/// Players and clips tried in order; the first clip present on disk is used
const SOUND_CANDIDATES: &[(&str, &str)] = &[
    ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
    ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
    ("aplay", "/usr/share/sounds/generic.wav"),
];

/// Best-effort audio playback. Implementations must never fail loudly.
#[async_trait]
pub trait SoundPlayer: Send + Sync {
    async fn play(&self);
}

/// Plays a short system clip through an external player
#[derive(Debug, Default)]
pub struct CommandSoundPlayer;

#[async_trait]
impl SoundPlayer for CommandSoundPlayer {
    async fn play(&self) {
        let Some((player, clip)) = SOUND_CANDIDATES
            .iter()
            .find(|(_, clip)| Path::new(clip).exists())
        else {
            return;
        };

        let child = Command::new(player)
            .arg(clip)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        if let Ok(mut child) = child {
            let _ = child.wait().await;
        }
    }
}

/// Used when sound is disabled
#[derive(Debug, Default)]
pub struct SilentPlayer;

#[async_trait]
impl SoundPlayer for SilentPlayer {
    async fn play(&self) {}
}
