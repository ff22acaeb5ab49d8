use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Queue behaviour configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueConfig {
    /// How many candidate ticket ids are tried before giving up on a collision streak.
    #[serde(default = "default_max_id_attempts")]
    pub max_id_attempts: u32,
    /// Refuse to dispatch to a counter that is already serving a ticket.
    #[serde(default)]
    pub enforce_counter_busy: bool,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_id_attempts: default_max_id_attempts(),
            enforce_counter_busy: false,
        }
    }
}

fn default_max_id_attempts() -> u32 {
    8
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            format: LogFormat::default(),
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
