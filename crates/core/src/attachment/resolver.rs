use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{Attachment, FetchError, HelpdeskApi, TicketAttachmentSource, TicketId};

/// Merges a ticket's own attachments with those of its requested items.
///
/// Order is ticket attachments first, then requested-item attachments in item
/// order. Duplicates are kept.
pub struct AttachmentResolver {
    api: Arc<dyn HelpdeskApi>,
}

impl AttachmentResolver {
    pub fn new(api: Arc<dyn HelpdeskApi>) -> Self {
        Self { api }
    }

    pub async fn resolve(&self, ticket_id: TicketId) -> Result<Vec<Attachment>, FetchError> {
        let (ticket, items) = tokio::try_join!(
            self.api.ticket(ticket_id),
            self.api.requested_items(ticket_id)
        )?;

        let mut attachments = ticket.attachments;
        attachments.extend(items.into_iter().flat_map(|item| item.attachments));

        debug!(
            "Resolved {} attachments for ticket {}",
            attachments.len(),
            ticket_id
        );
        Ok(attachments)
    }
}

#[async_trait]
impl TicketAttachmentSource for AttachmentResolver {
    async fn list_attachments(&self, ticket_id: TicketId) -> Result<Vec<Attachment>, FetchError> {
        self.resolve(ticket_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::RequestedItem;
    use crate::testing::{fixtures, MockHelpdesk};

    #[tokio::test]
    async fn test_ticket_attachments_come_first() {
        let helpdesk = Arc::new(MockHelpdesk::new());
        helpdesk
            .set_ticket_attachments(
                7,
                vec![
                    fixtures::attachment(1, "own1.pdf"),
                    fixtures::attachment(2, "own2.pdf"),
                ],
            )
            .await;
        helpdesk
            .set_requested_items(
                7,
                vec![RequestedItem {
                    id: 100,
                    attachments: vec![fixtures::attachment(3, "item1.pdf")],
                }],
            )
            .await;

        let resolver = AttachmentResolver::new(helpdesk);
        let names: Vec<String> = resolver
            .resolve(7)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();

        assert_eq!(names, vec!["own1.pdf", "own2.pdf", "item1.pdf"]);
    }

    #[tokio::test]
    async fn test_duplicates_are_kept() {
        let helpdesk = Arc::new(MockHelpdesk::new());
        let shared = fixtures::attachment(5, "shared.pdf");
        helpdesk
            .set_ticket_attachments(9, vec![shared.clone()])
            .await;
        helpdesk
            .set_requested_items(
                9,
                vec![
                    RequestedItem {
                        id: 1,
                        attachments: vec![shared.clone()],
                    },
                    RequestedItem {
                        id: 2,
                        attachments: vec![],
                    },
                ],
            )
            .await;

        let resolver = AttachmentResolver::new(helpdesk);
        let attachments = resolver.list_attachments(9).await.unwrap();
        assert_eq!(attachments, vec![shared.clone(), shared]);
    }

    #[tokio::test]
    async fn test_failed_lookup_propagates_status() {
        let helpdesk = Arc::new(MockHelpdesk::new());
        helpdesk.fail_requested_items_with(403).await;

        let resolver = AttachmentResolver::new(helpdesk);
        let err = resolver.resolve(1).await.unwrap_err();
        assert_eq!(err.status(), Some(403));
    }
}
