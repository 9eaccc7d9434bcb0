//! Runtime configuration from the environment

use crate::session::state::DEFAULT_AUDIO_MODE;
use crate::session::SessionContext;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TASK_NAME: &str = "vocab-quiz";
const DEFAULT_QUIT_GRACE_MS: u64 = 500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be an integer, got {value:?}")]
    NotAnInteger { var: &'static str, value: String },
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

/// Configuration for one quiz run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizConfig {
    pub server_url: String,
    pub task_name: String,
    pub task_type: Option<String>,
    /// Player command line, e.g. `mpv --really-quiet`. None plays nothing.
    pub audio_player: Option<String>,
    pub audio_mode: i64,
    /// How long to wait for an in-flight quit notification on exit
    pub quit_grace: Duration,
}

impl QuizConfig {
    /// Load from `LINGO_*` variables. `task_arg` (the first CLI argument)
    /// overrides `LINGO_TASK_NAME`.
    pub fn from_env(task_arg: Option<String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok(), task_arg)
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        task_arg: Option<String>,
    ) -> Result<Self, ConfigError> {
        let server_url = lookup("LINGO_SERVER_URL").unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        if server_url.trim().is_empty() {
            return Err(ConfigError::Empty {
                var: "LINGO_SERVER_URL",
            });
        }

        let task_name = task_arg
            .or_else(|| lookup("LINGO_TASK_NAME"))
            .unwrap_or_else(|| DEFAULT_TASK_NAME.to_string());
        if task_name.trim().is_empty() {
            return Err(ConfigError::Empty {
                var: "LINGO_TASK_NAME",
            });
        }

        let audio_mode = match lookup("LINGO_AUDIO_MODE") {
            Some(value) => parse_int("LINGO_AUDIO_MODE", &value)?,
            None => DEFAULT_AUDIO_MODE,
        };

        let quit_grace_ms = match lookup("LINGO_QUIT_GRACE_MS") {
            Some(value) => u64::try_from(parse_int("LINGO_QUIT_GRACE_MS", &value)?).map_err(|_| {
                ConfigError::NotAnInteger {
                    var: "LINGO_QUIT_GRACE_MS",
                    value,
                }
            })?,
            None => DEFAULT_QUIT_GRACE_MS,
        };

        Ok(Self {
            server_url,
            task_name,
            task_type: lookup("LINGO_TASK_TYPE").filter(|t| !t.trim().is_empty()),
            audio_player: lookup("LINGO_AUDIO_PLAYER").filter(|p| !p.trim().is_empty()),
            audio_mode,
            quit_grace: Duration::from_millis(quit_grace_ms),
        })
    }

    pub fn session_context(&self) -> SessionContext {
        let mut context = SessionContext::new(&self.task_name);
        if let Some(task_type) = &self.task_type {
            context = context.with_task_type(task_type);
        }
        context.audio_mode = self.audio_mode;
        context
    }
}

fn parse_int(var: &'static str, value: &str) -> Result<i64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::NotAnInteger {
            var,
            value: value.to_string(),
        })
}
