//! Bearer token providers.

use async_trait::async_trait;

use super::{AuthError, CredentialProvider};

/// Provider returning a fixed token.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

#[async_trait]
impl CredentialProvider for StaticTokenProvider {
    async fn current_credential(&self) -> Result<Option<String>, AuthError> {
        Ok(Some(self.token.clone()))
    }

    fn method_name(&self) -> &'static str {
        "token"
    }
}

/// Provider that reads the token from an environment variable on each call.
///
/// An unset or empty variable is reported as an error so the caller can log
/// it; the request itself still goes out.
pub struct EnvTokenProvider {
    var_name: String,
}

impl EnvTokenProvider {
    pub fn new(var_name: String) -> Self {
        Self { var_name }
    }
}

#[async_trait]
impl CredentialProvider for EnvTokenProvider {
    async fn current_credential(&self) -> Result<Option<String>, AuthError> {
        match std::env::var(&self.var_name) {
            Ok(value) if !value.trim().is_empty() => Ok(Some(value.trim().to_string())),
            Ok(_) => Err(AuthError::Unavailable(format!(
                "environment variable {} is empty",
                self.var_name
            ))),
            Err(_) => Err(AuthError::Unavailable(format!(
                "environment variable {} is not set",
                self.var_name
            ))),
        }
    }

    fn method_name(&self) -> &'static str {
        "env"
    }
}
