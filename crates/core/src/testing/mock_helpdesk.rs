//! Mock helpdesk API for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::attachment::{
    Attachment, FetchError, HelpdeskApi, RequestedItem, TicketDetail, TicketId,
};

/// Mock implementation of [`HelpdeskApi`].
///
/// Unknown tickets resolve to an empty ticket with no requested items.
#[derive(Debug, Default)]
pub struct MockHelpdesk {
    tickets: Arc<RwLock<HashMap<TicketId, Vec<Attachment>>>>,
    requested_items: Arc<RwLock<HashMap<TicketId, Vec<RequestedItem>>>>,
    ticket_failure: Arc<RwLock<Option<u16>>>,
    requested_items_failure: Arc<RwLock<Option<u16>>>,
}

impl MockHelpdesk {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_ticket_attachments(&self, ticket_id: TicketId, attachments: Vec<Attachment>) {
        self.tickets.write().await.insert(ticket_id, attachments);
    }

    pub async fn set_requested_items(&self, ticket_id: TicketId, items: Vec<RequestedItem>) {
        self.requested_items.write().await.insert(ticket_id, items);
    }

    /// Make every ticket lookup fail with the given HTTP status.
    pub async fn fail_ticket_with(&self, status: u16) {
        *self.ticket_failure.write().await = Some(status);
    }

    /// Make every requested-items lookup fail with the given HTTP status.
    pub async fn fail_requested_items_with(&self, status: u16) {
        *self.requested_items_failure.write().await = Some(status);
    }
}

fn api_error(status: u16) -> FetchError {
    FetchError::Api {
        status,
        message: format!("mock failure {}", status),
    }
}

#[async_trait]
impl HelpdeskApi for MockHelpdesk {
    async fn ticket(&self, ticket_id: TicketId) -> Result<TicketDetail, FetchError> {
        if let Some(status) = *self.ticket_failure.read().await {
            return Err(api_error(status));
        }
        Ok(TicketDetail {
            id: ticket_id,
            subject: Some(format!("Ticket {}", ticket_id)),
            attachments: self
                .tickets
                .read()
                .await
                .get(&ticket_id)
                .cloned()
                .unwrap_or_default(),
        })
    }

    async fn requested_items(&self, ticket_id: TicketId) -> Result<Vec<RequestedItem>, FetchError> {
        if let Some(status) = *self.requested_items_failure.read().await {
            return Err(api_error(status));
        }
        Ok(self
            .requested_items
            .read()
            .await
            .get(&ticket_id)
            .cloned()
            .unwrap_or_default())
    }
}
