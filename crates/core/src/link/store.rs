//! Link storage trait and types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attachment::TicketId;

/// Error type for link operations.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The ticket already has a document.
    #[error("Ticket {ticket_id} is already linked to document {document_uuid}")]
    AlreadyLinked {
        ticket_id: TicketId,
        document_uuid: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

/// Association between a ticket and its remote document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLink {
    pub ticket_id: TicketId,
    pub document_uuid: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to link an already existing document to a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewLink {
    pub ticket_id: TicketId,
    pub document_uuid: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Storage key for a ticket's link.
pub fn link_key(ticket_id: TicketId) -> String {
    format!("ticket:{}", ticket_id)
}

/// Trait for link storage backends.
///
/// Reads and writes are independent; callers own any read-then-write race.
pub trait LinkStore: Send + Sync {
    /// Get the link for a ticket, if any.
    fn get(&self, ticket_id: TicketId) -> Result<Option<DocumentLink>, LinkError>;

    /// Point a ticket at a document, replacing any previous link.
    fn set(&self, ticket_id: TicketId, document_uuid: &str) -> Result<SetOutcome, LinkError>;

    /// Remove a ticket's link.
    fn delete(&self, ticket_id: TicketId) -> Result<DeleteOutcome, LinkError>;

    /// Link an existing document. Fails if the ticket is already linked.
    fn create(&self, link: NewLink) -> Result<DocumentLink, LinkError>;
}
