//! Alert sinks
//!
//! Sinks are best-effort: a failed delivery is reported to the caller but
//! never changes the alert decision that produced it.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::engine::AlertEvent;
use crate::error::SinkError;

/// Consumer of fired alerts. Must not block the tick loop.
pub trait AlertSink: Send {
    fn dispatch(&self, event: &AlertEvent) -> Result<(), SinkError>;
}

/// Sink that only logs, for headless runs
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl AlertSink for LogSink {
    fn dispatch(&self, event: &AlertEvent) -> Result<(), SinkError> {
        info!("ALERT at {:.1}s: {}", event.at, event.sources.join(", "));
        Ok(())
    }
}

/// External audio player invocation; the sound path is appended last
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for PlayerCommand {
    fn default() -> Self {
        if cfg!(target_os = "macos") {
            Self {
                program: "afplay".to_string(),
                args: Vec::new(),
            }
        } else {
            Self {
                program: "ffplay".to_string(),
                args: ["-nodisp", "-autoexit", "-loglevel", "quiet"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }
        }
    }
}

/// Sound sink configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundConfig {
    /// Directory scanned for .mp3/.wav files on every alert
    pub sounds_dir: PathBuf,
    pub player: PlayerCommand,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            sounds_dir: PathBuf::from("sounds"),
            player: PlayerCommand::default(),
        }
    }
}

/// Pick a random playable file from `dir`
pub fn select_sound<R: rand::Rng + ?Sized>(dir: &Path, rng: &mut R) -> Result<PathBuf, SinkError> {
    let entries = std::fs::read_dir(dir).map_err(|source| SinkError::SoundDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut sounds: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_playable(path))
        .collect();
    sounds.sort();

    sounds
        .choose(rng)
        .cloned()
        .ok_or_else(|| SinkError::NoSounds(dir.to_path_buf()))
}

fn is_playable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("mp3") || ext.eq_ignore_ascii_case("wav"))
        .unwrap_or(false)
}

/// Plays a random sound through an external player, fire-and-forget
pub struct SoundSink {
    config: SoundConfig,
    runtime: Handle,
}

impl SoundSink {
    /// Create a sound sink that spawns players on `runtime`
    pub fn new(config: SoundConfig, runtime: Handle) -> Self {
        info!(
            "Sound sink using {} with sounds from {}",
            config.player.program,
            config.sounds_dir.display()
        );
        Self { config, runtime }
    }
}

impl AlertSink for SoundSink {
    fn dispatch(&self, event: &AlertEvent) -> Result<(), SinkError> {
        let sound = select_sound(&self.config.sounds_dir, &mut rand::thread_rng())?;
        debug!("Playing {} for alert at {:.1}s", sound.display(), event.at);

        // Child reaping needs the runtime's driver
        let _guard = self.runtime.enter();
        let mut child = Command::new(&self.config.player.program)
            .args(&self.config.player.args)
            .arg(&sound)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SinkError::Spawn {
                program: self.config.player.program.clone(),
                source,
            })?;

        self.runtime.spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => debug!("Player finished"),
                Ok(status) => warn!("Player exited with {}", status),
                Err(e) => warn!("Failed to wait for player: {}", e),
            }
        });

        Ok(())
    }
}
