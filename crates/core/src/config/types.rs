use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub helpdesk: HelpdeskConfig,
    pub signing: SigningConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Shared secret the helpdesk app sends with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_secret: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    AppSecret,
}

/// Database configuration (ticket/document links)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("signdesk.db")
}

/// Helpdesk REST API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HelpdeskConfig {
    /// Helpdesk account domain (e.g., "acme.freshservice.com")
    pub domain: String,
    /// Helpdesk API key, sent as the basic-auth user name
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_helpdesk_timeout")]
    pub timeout_secs: u32,
}

fn default_helpdesk_timeout() -> u32 {
    30
}

/// E-signature service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SigningConfig {
    /// API base URL (default: https://secure.d4sign.com.br)
    #[serde(default = "default_signing_base_url")]
    pub base_url: String,
    /// `tokenAPI` query credential
    pub token_api: String,
    /// `cryptKey` query credential
    pub crypt_key: String,
    /// Safe that receives every primary upload
    pub safe_uuid: String,
    /// Request timeout in seconds (default: 60)
    #[serde(default = "default_signing_timeout")]
    pub timeout_secs: u32,
}

fn default_signing_base_url() -> String {
    "https://secure.d4sign.com.br".to_string()
}

fn default_signing_timeout() -> u32 {
    60
}

/// Document submission tuning
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmissionConfig {
    /// Pause after each secondary upload, in milliseconds (default: 2000)
    #[serde(default = "default_secondary_delay")]
    pub secondary_upload_delay_ms: u64,
    /// Ask the signing service not to email signers when sending
    #[serde(default)]
    pub skip_signer_email: bool,
    /// Signing order policy used when sending a document
    #[serde(default)]
    pub signing_workflow: SigningWorkflow,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            secondary_upload_delay_ms: default_secondary_delay(),
            skip_signer_email: false,
            signing_workflow: SigningWorkflow::default(),
        }
    }
}

fn default_secondary_delay() -> u64 {
    2000
}

/// Whether signers must act in their declared order.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SigningWorkflow {
    #[default]
    Sequential,
    Parallel,
}

impl SigningWorkflow {
    /// Wire flag expected by the signing API ("1" = sequential).
    pub fn as_flag(&self) -> &'static str {
        match self {
            SigningWorkflow::Sequential => "1",
            SigningWorkflow::Parallel => "0",
        }
    }
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub helpdesk: SanitizedHelpdeskConfig,
    pub signing: SanitizedSigningConfig,
    pub submission: SubmissionConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    pub app_secret_configured: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedHelpdeskConfig {
    pub domain: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSigningConfig {
    pub base_url: String,
    pub safe_uuid: String,
    pub credentials_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::AppSecret => "app_secret".to_string(),
                },
                app_secret_configured: config
                    .auth
                    .app_secret
                    .as_ref()
                    .is_some_and(|s| !s.is_empty()),
            },
            server: config.server.clone(),
            database: config.database.clone(),
            helpdesk: SanitizedHelpdeskConfig {
                domain: config.helpdesk.domain.clone(),
                api_key_configured: !config.helpdesk.api_key.is_empty(),
                timeout_secs: config.helpdesk.timeout_secs,
            },
            signing: SanitizedSigningConfig {
                base_url: config.signing.base_url.clone(),
                safe_uuid: config.signing.safe_uuid.clone(),
                credentials_configured: !config.signing.token_api.is_empty()
                    && !config.signing.crypt_key.is_empty(),
                timeout_secs: config.signing.timeout_secs,
            },
            submission: config.submission.clone(),
        }
    }
}
