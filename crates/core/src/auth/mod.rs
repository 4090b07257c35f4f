//! Request authentication for calls coming from the helpdesk app.

mod app_secret;
mod none;
mod traits;
mod types;

pub use app_secret::AppSecretAuthenticator;
pub use none::NoneAuthenticator;
pub use traits::{AuthError, Authenticator};
pub use types::{AgentIdentity, AuthRequest, AGENT_EMAIL_HEADER, AGENT_NAME_HEADER};

use crate::config::{AuthConfig, AuthMethod};

/// Build the authenticator selected in config.
pub fn create_authenticator(config: &AuthConfig) -> Result<Box<dyn Authenticator>, AuthError> {
    match config.method {
        AuthMethod::None => Ok(Box::new(NoneAuthenticator::new())),
        AuthMethod::AppSecret => {
            let secret = config
                .app_secret
                .clone()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    AuthError::ConfigurationError(
                        "app_secret must be set when using the app_secret auth method"
                            .to_string(),
                    )
                })?;
            Ok(Box::new(AppSecretAuthenticator::new(secret)))
        }
    }
}
