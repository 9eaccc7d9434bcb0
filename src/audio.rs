//! Playback of synthesized listening cues

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;

/// Playback failures. All of them are non-fatal to a session.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to stage audio file {path}: {source}")]
    Stage {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to launch player {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("player {program} exited with {status}")]
    PlayerFailed { program: String, status: String },
}

/// Somewhere to play an audio blob. `play` returns once playback has finished.
#[async_trait]
pub trait AudioSink: Send + Sync {
    async fn play(&self, audio: &[u8]) -> Result<(), AudioError>;
}

/// Plays audio by handing a temp file to an external player command
pub struct CommandSink {
    program: String,
    args: Vec<String>,
}

impl CommandSink {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Parse a whitespace-separated command line such as `mpv --really-quiet`
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(String::from);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    async fn run_player(&self, path: &Path) -> Result<(), AudioError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| AudioError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(AudioError::PlayerFailed {
                program: self.program.clone(),
                status: status.to_string(),
            })
        }
    }
}

#[async_trait]
impl AudioSink for CommandSink {
    async fn play(&self, audio: &[u8]) -> Result<(), AudioError> {
        let path = std::env::temp_dir().join(format!("lingo-quiz-{}.audio", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, audio)
            .await
            .map_err(|source| AudioError::Stage {
                path: path.clone(),
                source,
            })?;

        let result = self.run_player(&path).await;

        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::debug!(path = %path.display(), error = %e, "Failed to remove staged audio");
        }
        result
    }
}

/// Discards audio; used when no player is configured
pub struct SilentSink;

#[async_trait]
impl AudioSink for SilentSink {
    async fn play(&self, audio: &[u8]) -> Result<(), AudioError> {
        tracing::info!(bytes = audio.len(), "No audio player configured, skipping playback");
        Ok(())
    }
}

#[async_trait]
impl<T: AudioSink + ?Sized> AudioSink for std::sync::Arc<T> {
    async fn play(&self, audio: &[u8]) -> Result<(), AudioError> {
        (**self).play(audio).await
    }
}
