//! Error taxonomy at the workflow boundary.

use thiserror::Error;

use crate::attachment::{FetchError, TicketId};
use crate::form::ValidationErrors;
use crate::link::LinkError;
use crate::signer::SignerOrderError;
use crate::signing::{DocumentStatus, SigningError};

/// Outcome of a failed or partially failed workflow operation.
///
/// By the time a workflow returns one of these the user has already been
/// notified.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Form values rejected; nothing was sent.
    #[error("Invalid form: {0}")]
    InvalidForm(ValidationErrors),

    /// Signer list rejected; nothing was sent.
    #[error("Invalid signers: {0}")]
    InvalidSigners(#[from] SignerOrderError),

    /// A remote call failed or returned an unexpected status.
    #[error("{operation} failed: {message}")]
    RemoteCall {
        operation: String,
        message: String,
        status: Option<u16>,
    },

    /// The primary upload failed; no document exists.
    #[error("Submission failed: {message}")]
    FatalSubmission { message: String },

    /// The document exists but some follow-up steps failed.
    #[error(
        "Document {document_uuid} was created with problems: {}",
        partial_summary(.failed_secondaries, .failed_signers, .link_error)
    )]
    PartialSubmission {
        document_uuid: String,
        failed_secondaries: Vec<String>,
        failed_signers: Vec<String>,
        link_error: Option<String>,
    },

    /// The document is past the stage where its signers may change.
    #[error("Signers of document {document_uuid} are locked (status {})", .status.as_str())]
    SignersLocked {
        document_uuid: String,
        status: DocumentStatus,
    },

    /// The ticket has no linked document.
    #[error("Ticket {ticket_id} has no linked document")]
    NotLinked { ticket_id: TicketId },

    #[error(transparent)]
    Link(#[from] LinkError),
}

impl From<ValidationErrors> for WorkflowError {
    fn from(errors: ValidationErrors) -> Self {
        WorkflowError::InvalidForm(errors)
    }
}

impl WorkflowError {
    pub fn remote(operation: &str, error: &SigningError) -> Self {
        WorkflowError::RemoteCall {
            operation: operation.to_string(),
            message: error.to_string(),
            status: error.status(),
        }
    }

    pub fn fetch(operation: &str, error: &FetchError) -> Self {
        WorkflowError::RemoteCall {
            operation: operation.to_string(),
            message: error.to_string(),
            status: error.status(),
        }
    }

    /// Rejected before any remote call was made.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WorkflowError::InvalidForm(_) | WorkflowError::InvalidSigners(_)
        )
    }

    /// Remote HTTP status behind the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            WorkflowError::RemoteCall { status, .. } => *status,
            _ => None,
        }
    }
}

fn partial_summary(
    failed_secondaries: &[String],
    failed_signers: &[String],
    link_error: &Option<String>,
) -> String {
    let mut parts = Vec::new();
    if !failed_secondaries.is_empty() {
        parts.push(format!(
            "attachments not uploaded: {}",
            failed_secondaries.join(", ")
        ));
    }
    if !failed_signers.is_empty() {
        parts.push(format!("signers not added: {}", failed_signers.join(", ")));
    }
    if let Some(error) = link_error {
        parts.push(format!("ticket link not saved: {}", error));
    }
    parts.join("; ")
}
