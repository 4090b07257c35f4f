use async_trait::async_trait;

use super::{AgentIdentity, AuthError, AuthRequest, Authenticator};

/// Accepts every request; agent details are still read from headers.
/// Must be explicitly configured.
pub struct NoneAuthenticator;

impl NoneAuthenticator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoneAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Authenticator for NoneAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<AgentIdentity, AuthError> {
        Ok(AgentIdentity::from_request(request, self.method_name()))
    }

    fn method_name(&self) -> &'static str {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_none_authenticator_accepts_empty_request() {
        let auth = NoneAuthenticator::new();
        let identity = auth.authenticate(&AuthRequest::default()).await.unwrap();
        assert_eq!(identity, AgentIdentity::anonymous());
    }
}
