use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub poller: PollerConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the brief API (e.g., "https://api.example.com/prod").
    pub base_url: String,
    /// Transport timeout for a single request in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// How the client obtains a bearer credential
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub method: AuthMethod,
    /// Bearer token, used when method = "token"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Name of the environment variable holding the token, used when method = "env".
    /// The variable is read on every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    #[default]
    None,
    Token,
    Env,
}

/// Status poller configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollerConfig {
    /// Delay between the end of one fetch and the start of the next (milliseconds).
    #[serde(default = "default_interval")]
    pub interval_ms: u64,
    /// Give up after this many fetches. Unbounded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

fn default_interval() -> u64 {
    5000 // 5 seconds
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval(),
            max_attempts: None,
        }
    }
}

/// Sanitized config for display (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub api: ApiConfig,
    pub auth: SanitizedAuthConfig,
    pub poller: PollerConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    pub token_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            api: config.api.clone(),
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::Token => "token".to_string(),
                    AuthMethod::Env => "env".to_string(),
                },
                token_configured: config
                    .auth
                    .token
                    .as_ref()
                    .is_some_and(|t| !t.is_empty()),
                token_env: config.auth.token_env.clone(),
            },
            poller: config.poller.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[api]
base_url = "https://api.example.com/prod"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.base_url, "https://api.example.com/prod");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.auth.method, AuthMethod::None);
        assert_eq!(config.poller.interval_ms, 5000);
        assert!(config.poller.max_attempts.is_none());
    }

    #[test]
    fn test_deserialize_missing_api_fails() {
        let toml = r#"
[poller]
interval_ms = 1000
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[api]
base_url = "http://localhost:3000"
timeout_secs = 10

[auth]
method = "env"
token_env = "PROOFBRIEF_TOKEN"

[poller]
interval_ms = 2500
max_attempts = 120
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.auth.method, AuthMethod::Env);
        assert_eq!(config.auth.token_env.as_deref(), Some("PROOFBRIEF_TOKEN"));
        assert_eq!(config.poller.interval_ms, 2500);
        assert_eq!(config.poller.max_attempts, Some(120));
    }

    #[test]
    fn test_sanitized_config_hides_token() {
        let config = Config {
            api: ApiConfig {
                base_url: "http://localhost:3000".to_string(),
                timeout_secs: 30,
            },
            auth: AuthConfig {
                method: AuthMethod::Token,
                token: Some("super-secret".to_string()),
                token_env: None,
            },
            poller: PollerConfig::default(),
        };

        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.auth.method, "token");
        assert!(sanitized.auth.token_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("super-secret"));
    }
}
