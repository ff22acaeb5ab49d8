use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - At least one ticket id attempt is allowed
/// - Log filter is not blank
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.queue.max_id_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "queue.max_id_attempts cannot be 0".to_string(),
        ));
    }

    if config.logging.filter.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "logging.filter cannot be empty".to_string(),
        ));
    }

    Ok(())
}
