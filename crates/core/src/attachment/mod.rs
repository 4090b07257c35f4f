//! Ticket attachments: fetched from the helpdesk, merged for one submission.

mod helpdesk;
mod resolver;
mod types;

pub use helpdesk::HelpdeskClient;
pub use resolver::AttachmentResolver;
pub use types::{Attachment, AttachmentId, RequestedItem, TicketDetail, TicketId};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from helpdesk lookups.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Helpdesk answered with a non-success status.
    #[error("Helpdesk API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl FetchError {
    /// Remote HTTP status, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http(e) => e.status().map(|s| s.as_u16()),
            FetchError::Api { status, .. } => Some(*status),
            FetchError::Parse(_) => None,
        }
    }
}

/// Raw helpdesk lookups used to assemble a ticket's attachment list.
#[async_trait]
pub trait HelpdeskApi: Send + Sync {
    /// Fetch the ticket detail, including its own attachments.
    async fn ticket(&self, ticket_id: TicketId) -> Result<TicketDetail, FetchError>;

    /// Fetch the service-catalog items requested on the ticket.
    async fn requested_items(&self, ticket_id: TicketId) -> Result<Vec<RequestedItem>, FetchError>;
}

/// Source of every attachment selectable for a ticket's document.
#[async_trait]
pub trait TicketAttachmentSource: Send + Sync {
    async fn list_attachments(&self, ticket_id: TicketId) -> Result<Vec<Attachment>, FetchError>;
}
