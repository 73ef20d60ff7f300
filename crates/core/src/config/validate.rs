use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - TVMaze base URL is http(s) and the timeout is positive
/// - At least one default catalog page
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let base_url = &config.tvmaze.base_url;
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "tvmaze.base_url must be an http(s) URL, got {:?}",
            base_url
        )));
    }

    if config.tvmaze.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "tvmaze.timeout_secs must be greater than 0".to_string(),
        ));
    }

    if config.catalog.default_pages.is_empty() {
        return Err(ConfigError::ValidationError(
            "catalog.default_pages cannot be empty".to_string(),
        ));
    }

    Ok(())
}
