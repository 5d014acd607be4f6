use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Credential unavailable: {0}")]
    Unavailable(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Source of the bearer credential attached to API requests.
///
/// Queried on every request so that session refreshes are picked up
/// without rebuilding the client.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Current credential, or `None` when the session has none.
    async fn current_credential(&self) -> Result<Option<String>, AuthError>;

    /// Name of this credential method
    fn method_name(&self) -> &'static str;
}
