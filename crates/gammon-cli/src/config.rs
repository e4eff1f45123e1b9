//! Output configuration from environment variables

use std::env;

use clap::ValueEnum;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: GAMMON_FORMAT must be json or summary, got {0:?}")]
    InvalidFormat(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Full match model as JSON
    #[default]
    Json,
    /// Human-readable overview
    Summary,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// Output format (GAMMON_FORMAT)
    pub format: OutputFormat,

    /// Single-line JSON instead of pretty-printed (GAMMON_COMPACT)
    pub compact: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(env::var("GAMMON_FORMAT").ok(), env::var("GAMMON_COMPACT").ok())
    }

    fn from_vars(format: Option<String>, compact: Option<String>) -> Result<Self, ConfigError> {
        let format = match format.as_deref().map(str::trim) {
            None | Some("") => OutputFormat::default(),
            Some(value) => OutputFormat::from_str(value, true)
                .map_err(|_| ConfigError::InvalidFormat(value.to_string()))?,
        };

        let compact = compact
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "" | "0" | "false" | "no"))
            .unwrap_or(false);

        Ok(Self { format, compact })
    }

    /// Command-line flags win over the environment.
    pub fn with_overrides(mut self, format: Option<OutputFormat>, compact: bool) -> Self {
        if let Some(format) = format {
            self.format = format;
        }
        self.compact |= compact;
        self
    }
}
