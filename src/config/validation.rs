use crate::config::types::{Config, CrawlerConfig, HttpConfig, OutputConfig, OverrideEntry};
use crate::crawler::rules::{compile_pattern, Field};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    validate_overrides(&config.overrides)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 {
        return Err(ConfigError::Validation(format!(
            "workers must be >= 1, got {}",
            config.workers
        )));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.results_path.is_empty() {
        return Err(ConfigError::Validation(
            "results-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates extraction overrides: known field, non-empty domain, compiling pattern
fn validate_overrides(overrides: &[OverrideEntry]) -> Result<(), ConfigError> {
    for entry in overrides {
        if entry.domain.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "Override for field '{}' has an empty domain",
                entry.field
            )));
        }

        let field: Field = entry
            .field
            .parse()
            .map_err(|e| ConfigError::Validation(format!("{}", e)))?;

        compile_pattern(field, &entry.pattern).map_err(|e| {
            ConfigError::Validation(format!("Override for '{}': {}", entry.domain, e))
        })?;
    }

    Ok(())
}
