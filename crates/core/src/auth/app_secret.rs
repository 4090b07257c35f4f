//! Shared-secret authentication for the helpdesk app.

use async_trait::async_trait;

use super::{AgentIdentity, AuthError, AuthRequest, Authenticator};

/// Validates the secret the helpdesk app was installed with.
///
/// Accepts the secret in either:
/// - `X-App-Secret: <secret>` header
/// - `Authorization: Bearer <secret>` header
pub struct AppSecretAuthenticator {
    expected: String,
}

impl AppSecretAuthenticator {
    pub fn new(secret: String) -> Self {
        Self { expected: secret }
    }

    fn extract_secret<'a>(&self, request: &'a AuthRequest) -> Option<&'a str> {
        if let Some(secret) = request.header("x-app-secret") {
            return Some(secret);
        }
        let auth_header = request.header("authorization")?;
        auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
    }
}

#[async_trait]
impl Authenticator for AppSecretAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<AgentIdentity, AuthError> {
        let provided = self
            .extract_secret(request)
            .ok_or(AuthError::NotAuthenticated)?;

        if constant_time_eq(provided.as_bytes(), self.expected.as_bytes()) {
            Ok(AgentIdentity::from_request(request, self.method_name()))
        } else {
            Err(AuthError::InvalidCredentials("Invalid app secret".to_string()))
        }
    }

    fn method_name(&self) -> &'static str {
        "app_secret"
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn request(pairs: &[(&str, &str)]) -> AuthRequest {
        AuthRequest {
            headers: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[tokio::test]
    async fn test_secret_header_accepted() {
        let auth = AppSecretAuthenticator::new("s3cret".to_string());
        let identity = auth
            .authenticate(&request(&[
                ("x-app-secret", "s3cret"),
                ("x-agent-email", "ana@acme.com"),
                ("x-agent-name", "Ana"),
            ]))
            .await
            .unwrap();
        assert_eq!(identity.email.as_deref(), Some("ana@acme.com"));
        assert_eq!(identity.name.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn test_bearer_header_accepted() {
        let auth = AppSecretAuthenticator::new("s3cret".to_string());
        let result = auth
            .authenticate(&request(&[("authorization", "Bearer s3cret")]))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_missing_secret_rejected() {
        let auth = AppSecretAuthenticator::new("s3cret".to_string());
        let result = auth.authenticate(&request(&[])).await;
        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let auth = AppSecretAuthenticator::new("s3cret".to_string());
        let result = auth
            .authenticate(&request(&[("x-app-secret", "s3cres")]))
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials(_))));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
    }
}
