use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Header carrying the acting agent's email.
pub const AGENT_EMAIL_HEADER: &str = "x-agent-email";
/// Header carrying the acting agent's display name.
pub const AGENT_NAME_HEADER: &str = "x-agent-name";

/// Request information for authentication. Header names are lowercase.
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
    pub headers: HashMap<String, String>,
}

impl AuthRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// The helpdesk agent on whose behalf the request runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentIdentity {
    pub email: Option<String>,
    pub name: Option<String>,
    pub method: String,
}

impl AgentIdentity {
    pub fn anonymous() -> Self {
        Self {
            email: None,
            name: None,
            method: "none".to_string(),
        }
    }

    /// Read agent details from the request headers.
    pub fn from_request(request: &AuthRequest, method: &str) -> Self {
        Self {
            email: request.header(AGENT_EMAIL_HEADER).map(str::to_string),
            name: request.header(AGENT_NAME_HEADER).map(str::to_string),
            method: method.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_identity() {
        let identity = AgentIdentity::anonymous();
        assert!(identity.email.is_none());
        assert_eq!(identity.method, "none");
    }

    #[test]
    fn test_identity_from_headers_ignores_blank_values() {
        let mut headers = HashMap::new();
        headers.insert(AGENT_EMAIL_HEADER.to_string(), "ana@acme.com".to_string());
        headers.insert(AGENT_NAME_HEADER.to_string(), "   ".to_string());
        let request = AuthRequest { headers };

        let identity = AgentIdentity::from_request(&request, "app_secret");
        assert_eq!(identity.email.as_deref(), Some("ana@acme.com"));
        assert!(identity.name.is_none());
        assert_eq!(identity.method, "app_secret");
    }
}
