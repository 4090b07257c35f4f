//! Testing utilities and mock implementations of the external collaborators.
//!
//! # Example
//!
//! ```rust,ignore
//! use signdesk_core::testing::{fixtures, MockHelpdesk, MockSigningClient};
//!
//! let helpdesk = MockHelpdesk::new();
//! helpdesk.set_ticket_attachments(7, vec![fixtures::attachment(1, "contract.pdf")]).await;
//!
//! let signing = MockSigningClient::new();
//! signing.fail_secondary_upload(0).await;
//!
//! // Use in AppState...
//! ```

mod mock_helpdesk;
mod mock_link_store;
mod mock_signing;
mod recording_notifier;

pub use mock_helpdesk::MockHelpdesk;
pub use mock_link_store::MockLinkStore;
pub use mock_signing::{MockSigningClient, RecordedUpload};
pub use recording_notifier::RecordingNotifier;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::attachment::{Attachment, AttachmentId};
    use crate::config::{
        AuthConfig, AuthMethod, Config, DatabaseConfig, HelpdeskConfig, ServerConfig,
        SigningConfig, SubmissionConfig,
    };
    use crate::signing::{DocumentStatus, RemoteDocument, RemoteSigner};

    /// A PDF attachment served from a fake file host.
    pub fn attachment(id: AttachmentId, name: &str) -> Attachment {
        Attachment {
            id,
            name: name.to_string(),
            url: format!("https://files.example.com/attachments/{}", id),
            content_type: "application/pdf".to_string(),
            size: 1024 * 100,
        }
    }

    pub fn remote_signer(key: &str, email: &str) -> RemoteSigner {
        RemoteSigner {
            key_signer: Some(key.to_string()),
            email: email.to_string(),
            name: Some("Signer".to_string()),
            document: Some("12345678909".to_string()),
            type_code: Some("1".to_string()),
            nomenclature: None,
            certificate_flag: Some("0".to_string()),
        }
    }

    /// A remote document with the given `statusId` (defaults to draft if unknown).
    pub fn remote_document(uuid: &str, name: &str, status_code: &str) -> RemoteDocument {
        RemoteDocument {
            uuid: uuid.to_string(),
            name: name.to_string(),
            status: DocumentStatus::from_code(status_code).unwrap_or(DocumentStatus::Draft),
            status_code: status_code.to_string(),
            status_label: format!("status {}", status_code),
        }
    }

    /// Complete config pointing at unreachable services, with no auth.
    pub fn config() -> Config {
        Config {
            auth: AuthConfig {
                method: AuthMethod::None,
                app_secret: None,
            },
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            helpdesk: HelpdeskConfig {
                domain: "acme.freshservice.com".to_string(),
                api_key: "helpdesk-key".to_string(),
                timeout_secs: 5,
            },
            signing: SigningConfig {
                base_url: "https://sandbox.d4sign.com.br".to_string(),
                token_api: "token".to_string(),
                crypt_key: "crypt".to_string(),
                safe_uuid: "safe-1".to_string(),
                timeout_secs: 5,
            },
            submission: SubmissionConfig {
                secondary_upload_delay_ms: 0,
                ..SubmissionConfig::default()
            },
        }
    }
}
