//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{AppConfig, LogOutput, LoggingConfig};
use cqhttp::CqhttpConfig;

/// Validates the entire configuration.
pub fn validate_config(config: &AppConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_cqhttp_config(&config.cqhttp)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File {
        match &logging.file_path {
            None => return Err(ConfigError::missing_field("logging.file_path")),
            Some(path) if path.file_name().is_none() => {
                return Err(ConfigError::validation(format!(
                    "Log file path has no file name: {}",
                    path.display()
                )));
            }
            Some(_) => {}
        }
    }

    // Filter keys become `<module>=<level>` directives.
    for module in logging.filters.keys() {
        if module.is_empty() || module.contains(['=', ',', ' ']) {
            return Err(ConfigError::validation(format!(
                "Invalid log filter target: {module:?}"
            )));
        }
    }

    Ok(())
}

fn validate_cqhttp_config(cqhttp: &CqhttpConfig) -> ConfigResult<()> {
    if cqhttp.api_timeout_ms == 0 {
        return Err(ConfigError::validation(
            "cqhttp.api_timeout_ms must be greater than 0",
        ));
    }
    Ok(())
}
