use super::{
    types::{AuthMethod, Config},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - API base URL is an http(s) URL
/// - Poll interval is not 0, attempt limit (if any) is not 0
/// - The selected auth method has what it needs
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let base_url = config.api.base_url.trim();
    if base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "api.base_url cannot be empty".to_string(),
        ));
    }
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "api.base_url must start with http:// or https://, got '{}'",
            base_url
        )));
    }

    if config.poller.interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "poller.interval_ms cannot be 0".to_string(),
        ));
    }
    if config.poller.max_attempts == Some(0) {
        return Err(ConfigError::ValidationError(
            "poller.max_attempts cannot be 0".to_string(),
        ));
    }

    match config.auth.method {
        AuthMethod::None => {}
        AuthMethod::Token => {
            if config.auth.token.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigError::ValidationError(
                    "auth.token must be set when using token auth method".to_string(),
                ));
            }
        }
        AuthMethod::Env => {
            if config.auth.token_env.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigError::ValidationError(
                    "auth.token_env must be set when using env auth method".to_string(),
                ));
            }
        }
    }

    Ok(())
}
