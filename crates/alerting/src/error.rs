//! Alert sink error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors while delivering an alert
#[derive(Debug, Error)]
pub enum SinkError {
    /// Sound directory missing or unreadable
    #[error("Sound directory {} unavailable: {source}", .path.display())]
    SoundDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory holds no playable files
    #[error("No .mp3 or .wav files in {}", .0.display())]
    NoSounds(PathBuf),

    /// Player process could not be started
    #[error("Failed to start player '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
