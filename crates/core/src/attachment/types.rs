use serde::{Deserialize, Serialize};

/// Helpdesk ticket display id.
pub type TicketId = u64;

/// Helpdesk attachment id.
pub type AttachmentId = u64;

/// A file attached to a ticket or to one of its requested items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub name: String,
    /// Download URL for the file content.
    #[serde(alias = "attachment_url")]
    pub url: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub size: u64,
}

/// Ticket fields needed for attachment resolution.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketDetail {
    pub id: TicketId,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// A service-catalog item requested on a ticket.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestedItem {
    pub id: u64,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}
