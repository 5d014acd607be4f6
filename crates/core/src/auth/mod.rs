mod none;
mod token;
mod traits;

pub use none::*;
pub use token::*;
pub use traits::*;

use crate::config::AuthConfig;

/// Factory function to create a credential provider from config
pub fn create_credential_provider(
    config: &AuthConfig,
) -> Result<Box<dyn CredentialProvider>, AuthError> {
    use crate::config::AuthMethod;

    match config.method {
        AuthMethod::None => Ok(Box::new(NoCredentials::new())),
        AuthMethod::Token => {
            let token = config.token.clone().ok_or_else(|| {
                AuthError::ConfigurationError(
                    "token must be set when using token auth method".to_string(),
                )
            })?;
            Ok(Box::new(StaticTokenProvider::new(token)))
        }
        AuthMethod::Env => {
            let var_name = config.token_env.clone().ok_or_else(|| {
                AuthError::ConfigurationError(
                    "token_env must be set when using env auth method".to_string(),
                )
            })?;
            Ok(Box::new(EnvTokenProvider::new(var_name)))
        }
    }
}
