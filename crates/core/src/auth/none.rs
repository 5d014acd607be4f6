use async_trait::async_trait;

use super::{AuthError, CredentialProvider};

/// Provider that never yields a credential; requests go out unauthenticated.
pub struct NoCredentials;

impl NoCredentials {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoCredentials {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialProvider for NoCredentials {
    async fn current_credential(&self) -> Result<Option<String>, AuthError> {
        Ok(None)
    }

    fn method_name(&self) -> &'static str {
        "none"
    }
}
