//! Remote e-signature service: documents, uploads and signer lists.

mod d4sign;
mod types;

pub use d4sign::D4SignClient;
pub use types::{
    DocumentStatus, RemoteDocument, RemoteSigner, SendOptions, SignerMutation, SignerPayload,
    UploadedDocument,
};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the signing service.
#[derive(Debug, Error)]
pub enum SigningError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The attachment source could not be downloaded.
    #[error("Failed to download {url}: {message}")]
    SourceDownload { url: String, message: String },

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl SigningError {
    /// Remote HTTP status, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            SigningError::Http(e) => e.status().map(|s| s.as_u16()),
            SigningError::NotFound(_) => Some(404),
            SigningError::Api { status, .. } => Some(*status),
            SigningError::SourceDownload { .. } | SigningError::Parse(_) => None,
        }
    }
}

/// Operations the workflows need from the e-signature service.
#[async_trait]
pub trait RemoteSigningClient: Send + Sync {
    /// Create a document from the file at `source_url`.
    async fn upload_primary(
        &self,
        source_url: &str,
        mime_type: &str,
        filename: &str,
    ) -> Result<UploadedDocument, SigningError>;

    /// Append the file at `source_url` to an existing document.
    async fn upload_secondary(
        &self,
        source_url: &str,
        filename: &str,
        document_uuid: &str,
    ) -> Result<(), SigningError>;

    /// Register one signer on a document.
    async fn add_signer(
        &self,
        document_uuid: &str,
        payload: &SignerPayload,
    ) -> Result<SignerMutation, SigningError>;

    /// Remove a signer identified by its remote key and email.
    async fn remove_signer(
        &self,
        document_uuid: &str,
        signer_key: &str,
        email: &str,
    ) -> Result<SignerMutation, SigningError>;

    /// Current signer list of a document.
    async fn list_signers(&self, document_uuid: &str) -> Result<Vec<RemoteSigner>, SigningError>;

    async fn get_document(&self, document_uuid: &str) -> Result<RemoteDocument, SigningError>;

    async fn cancel_document(&self, document_uuid: &str) -> Result<RemoteDocument, SigningError>;

    /// Release the document to its signers.
    async fn send_to_signers(
        &self,
        document_uuid: &str,
        options: &SendOptions,
    ) -> Result<(), SigningError>;
}
