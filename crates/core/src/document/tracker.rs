use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::attachment::TicketId;
use crate::error::WorkflowError;
use crate::link::{DeleteOutcome, DocumentLink, LinkError, LinkStore, NewLink};
use crate::metrics::{self, LINK_OPERATIONS};
use crate::notify::{HostEvent, Notification, NotificationSink};
use crate::signer::SignerManagementWorkflow;
use crate::signing::{DocumentStatus, RemoteDocument, RemoteSigningClient, SendOptions, SigningError};
use crate::submission::EventCallback;

/// A ticket's link together with the live remote document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedDocument {
    pub link: DocumentLink,
    pub document: RemoteDocument,
}

/// Reads and acts on the document linked to a ticket.
pub struct DocumentTracker {
    signing: Arc<dyn RemoteSigningClient>,
    links: Arc<dyn LinkStore>,
    notifier: Arc<dyn NotificationSink>,
    send_options: SendOptions,
    on_event: Option<EventCallback>,
}

impl DocumentTracker {
    pub fn new(
        signing: Arc<dyn RemoteSigningClient>,
        links: Arc<dyn LinkStore>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            signing,
            links,
            notifier,
            send_options: SendOptions::default(),
            on_event: None,
        }
    }

    pub fn with_send_options(mut self, options: SendOptions) -> Self {
        self.send_options = options;
        self
    }

    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.on_event = Some(callback);
        self
    }

    /// Current document of a ticket.
    ///
    /// A canceled document drops the link. A document the service no longer
    /// knows is reported as absent without notifying.
    pub async fn load(&self, ticket_id: TicketId) -> Result<Option<TrackedDocument>, WorkflowError> {
        let Some(link) = self.get_link(ticket_id)? else {
            return Ok(None);
        };

        match self.signing.get_document(&link.document_uuid).await {
            Ok(document) if document.status == DocumentStatus::Canceled => {
                info!(
                    "Document {} of ticket {} was canceled; removing link",
                    document.uuid, ticket_id
                );
                self.delete_link(ticket_id)?;
                Ok(None)
            }
            Ok(document) => Ok(Some(TrackedDocument { link, document })),
            Err(SigningError::NotFound(_)) => {
                debug!(
                    "Document {} of ticket {} not found remotely",
                    link.document_uuid, ticket_id
                );
                Ok(None)
            }
            Err(e) => {
                self.notifier.notify(Notification::error(
                    "Error",
                    format!("Could not load the ticket's document: {}", e),
                ));
                Err(WorkflowError::remote("get document", &e))
            }
        }
    }

    /// Cancel the ticket's document and drop the link once the service confirms.
    pub async fn cancel(&self, ticket_id: TicketId) -> Result<RemoteDocument, WorkflowError> {
        let link = self.require_link(ticket_id)?;

        let document = match self.signing.cancel_document(&link.document_uuid).await {
            Ok(document) => document,
            Err(e) => {
                warn!("Failed to cancel document {}: {}", link.document_uuid, e);
                self.notifier.notify(Notification::error(
                    "Error",
                    "The document could not be canceled",
                ));
                return Err(WorkflowError::remote("cancel document", &e));
            }
        };

        if document.status == DocumentStatus::Canceled {
            self.notifier.notify(Notification::success(
                "Document canceled",
                format!("{} was canceled", document.name),
            ));
            if let Err(e) = self.delete_link(ticket_id) {
                warn!("Ticket {}: canceled document still linked: {}", ticket_id, e);
            }
        } else {
            self.notifier.notify(Notification::warning(
                "Cancellation pending",
                format!("{} is now {}", document.name, document.status_label),
            ));
        }

        Ok(document)
    }

    /// Link a document that already exists remotely, without uploading anything.
    pub async fn link_existing(
        &self,
        ticket_id: TicketId,
        document_uuid: &str,
    ) -> Result<TrackedDocument, WorkflowError> {
        let document = match self.signing.get_document(document_uuid).await {
            Ok(document) => document,
            Err(e) => {
                self.notifier.notify(Notification::error(
                    "Error",
                    format!("Document {} could not be found: {}", document_uuid, e),
                ));
                return Err(WorkflowError::remote("get document", &e));
            }
        };

        let created = self.links.create(NewLink {
            ticket_id,
            document_uuid: document.uuid.clone(),
        });
        LINK_OPERATIONS
            .with_label_values(&["create", metrics::result_label(created.is_ok())])
            .inc();

        match created {
            Ok(link) => {
                self.notifier.notify(Notification::success(
                    "Document linked",
                    format!("{} is now linked to this ticket", document.name),
                ));
                Ok(TrackedDocument { link, document })
            }
            Err(e) => {
                self.notifier
                    .notify(Notification::error("Error", e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Release the ticket's document to its signers.
    pub async fn send_to_signers(&self, ticket_id: TicketId) -> Result<RemoteDocument, WorkflowError> {
        let link = self.require_link(ticket_id)?;

        let result = match self.signing.get_document(&link.document_uuid).await {
            Ok(document) => self
                .signing
                .send_to_signers(&document.uuid, &self.send_options)
                .await
                .map(|()| document),
            Err(e) => Err(e),
        };

        match result {
            Ok(document) => {
                info!("Document {} sent to signers", document.uuid);
                self.notifier.notify(Notification::success(
                    "Document sent",
                    format!("{} was sent for signature", document.name),
                ));
                if let Some(callback) = &self.on_event {
                    callback(HostEvent::DocumentSent);
                }
                Ok(document)
            }
            Err(e) => {
                self.notifier.notify(Notification::error(
                    "Error",
                    format!("The document could not be sent: {}", e),
                ));
                Err(WorkflowError::remote("send to signers", &e))
            }
        }
    }

    /// Signer management for the ticket's document.
    ///
    /// Only available while the document waits for signers; once it is out
    /// for signature or finished the party list is frozen.
    pub async fn signers(&self, ticket_id: TicketId) -> Result<SignerManagementWorkflow, WorkflowError> {
        let link = self.require_link(ticket_id)?;

        let document = match self.signing.get_document(&link.document_uuid).await {
            Ok(document) => document,
            Err(e) => {
                self.notifier.notify(Notification::error(
                    "Error",
                    format!("Could not load the ticket's document: {}", e),
                ));
                return Err(WorkflowError::remote("get document", &e));
            }
        };

        if !document.accepts_signer_changes() {
            debug!(
                "Document {} is {}; signer changes refused",
                document.uuid,
                document.status.as_str()
            );
            self.notifier.notify(Notification::error(
                "Signers locked",
                format!(
                    "Signers of {} can no longer be changed ({})",
                    document.name, document.status_label
                ),
            ));
            return Err(WorkflowError::SignersLocked {
                document_uuid: document.uuid,
                status: document.status,
            });
        }

        SignerManagementWorkflow::load(self.signing.clone(), self.notifier.clone(), document.uuid)
            .await
    }

    fn get_link(&self, ticket_id: TicketId) -> Result<Option<DocumentLink>, WorkflowError> {
        self.links.get(ticket_id).map_err(|e| {
            self.notifier
                .notify(Notification::error("Error", e.to_string()));
            WorkflowError::from(e)
        })
    }

    fn require_link(&self, ticket_id: TicketId) -> Result<DocumentLink, WorkflowError> {
        match self.get_link(ticket_id)? {
            Some(link) => Ok(link),
            None => {
                self.notifier.notify(Notification::error(
                    "Error",
                    "This ticket has no linked document",
                ));
                Err(WorkflowError::NotLinked { ticket_id })
            }
        }
    }

    fn delete_link(&self, ticket_id: TicketId) -> Result<DeleteOutcome, LinkError> {
        let result = self.links.delete(ticket_id);
        LINK_OPERATIONS
            .with_label_values(&["delete", metrics::result_label(result.is_ok())])
            .inc();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::link::SqliteLinkStore;
    use crate::notify::NotificationKind;
    use crate::testing::{fixtures, MockSigningClient, RecordingNotifier};

    struct Harness {
        client: Arc<MockSigningClient>,
        links: Arc<SqliteLinkStore>,
        notifier: Arc<RecordingNotifier>,
        events: Arc<Mutex<Vec<HostEvent>>>,
        tracker: DocumentTracker,
    }

    fn harness() -> Harness {
        let client = Arc::new(MockSigningClient::new());
        let links = Arc::new(SqliteLinkStore::in_memory().unwrap());
        let notifier = Arc::new(RecordingNotifier::new());
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let tracker = DocumentTracker::new(client.clone(), links.clone(), notifier.clone())
            .with_event_callback(Arc::new(move |event| sink.lock().unwrap().push(event)));
        Harness {
            client,
            links,
            notifier,
            events,
            tracker,
        }
    }

    #[tokio::test]
    async fn test_load_without_link() {
        let h = harness();
        assert!(h.tracker.load(1).await.unwrap().is_none());
        assert!(h.notifier.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_load_returns_live_document() {
        let h = harness();
        h.links.set(1, "doc-1").unwrap();
        h.client
            .add_document(fixtures::remote_document("doc-1", "Contract.pdf", "2"))
            .await;

        let tracked = h.tracker.load(1).await.unwrap().unwrap();
        assert_eq!(tracked.document.status, DocumentStatus::ReadyToSign);
        assert_eq!(tracked.link.document_uuid, "doc-1");
    }

    #[tokio::test]
    async fn test_load_canceled_document_drops_link() {
        let h = harness();
        h.links.set(1, "doc-1").unwrap();
        h.client
            .add_document(fixtures::remote_document("doc-1", "Contract.pdf", "6"))
            .await;

        assert!(h.tracker.load(1).await.unwrap().is_none());
        assert!(h.links.get(1).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_missing_document_is_silent() {
        let h = harness();
        h.links.set(1, "gone").unwrap();

        assert!(h.tracker.load(1).await.unwrap().is_none());
        assert!(h.notifier.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_load_other_failures_notify() {
        let h = harness();
        h.links.set(1, "doc-1").unwrap();
        h.client
            .set_next_error(SigningError::Api {
                status: 503,
                message: "maintenance".to_string(),
            })
            .await;

        let err = h.tracker.load(1).await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(h.notifier.kinds(), vec![NotificationKind::Error]);
    }

    #[tokio::test]
    async fn test_cancel_removes_link() {
        let h = harness();
        h.links.set(1, "doc-1").unwrap();
        h.client
            .add_document(fixtures::remote_document("doc-1", "Contract.pdf", "2"))
            .await;

        let document = h.tracker.cancel(1).await.unwrap();

        assert_eq!(document.status, DocumentStatus::Canceled);
        assert!(h.links.get(1).unwrap().is_none());
        assert_eq!(h.notifier.kinds(), vec![NotificationKind::Success]);
    }

    #[tokio::test]
    async fn test_cancel_pending_keeps_link() {
        let h = harness();
        h.links.set(1, "doc-1").unwrap();
        h.client
            .add_document(fixtures::remote_document("doc-1", "Contract.pdf", "3"))
            .await;
        h.client.set_cancel_pending(true).await;

        let document = h.tracker.cancel(1).await.unwrap();

        assert_eq!(document.status, DocumentStatus::Signing);
        assert_eq!(h.links.get(1).unwrap().unwrap().document_uuid, "doc-1");
        assert_eq!(h.notifier.kinds(), vec![NotificationKind::Warning]);
    }

    #[tokio::test]
    async fn test_cancel_without_link() {
        let h = harness();
        assert!(matches!(
            h.tracker.cancel(5).await,
            Err(WorkflowError::NotLinked { ticket_id: 5 })
        ));
    }

    #[tokio::test]
    async fn test_link_existing_document() {
        let h = harness();
        h.client
            .add_document(fixtures::remote_document("doc-7", "Old.pdf", "3"))
            .await;

        let tracked = h.tracker.link_existing(3, "doc-7").await.unwrap();
        assert_eq!(tracked.link.ticket_id, 3);
        assert_eq!(h.links.get(3).unwrap().unwrap().document_uuid, "doc-7");
    }

    #[tokio::test]
    async fn test_link_existing_rejects_unknown_document() {
        let h = harness();
        let err = h.tracker.link_existing(3, "nope").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(h.links.get(3).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_link_existing_rejects_linked_ticket() {
        let h = harness();
        h.links.set(3, "doc-1").unwrap();
        h.client
            .add_document(fixtures::remote_document("doc-7", "Old.pdf", "2"))
            .await;

        let err = h.tracker.link_existing(3, "doc-7").await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Link(LinkError::AlreadyLinked { .. })
        ));
    }

    #[tokio::test]
    async fn test_signers_open_while_waiting_for_signers() {
        let h = harness();
        h.links.set(1, "doc-1").unwrap();
        h.client
            .add_document(fixtures::remote_document("doc-1", "Contract.pdf", "2"))
            .await;
        h.client
            .set_signers("doc-1", vec![fixtures::remote_signer("key-1", "a@example.com")])
            .await;

        let workflow = h.tracker.signers(1).await.unwrap();
        assert_eq!(workflow.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_signers_locked_once_signing() {
        let h = harness();
        h.links.set(5, "doc-5").unwrap();
        h.client
            .add_document(fixtures::remote_document("doc-5", "Contract.pdf", "3"))
            .await;

        let err = h.tracker.signers(5).await.err().unwrap();

        assert!(matches!(
            err,
            WorkflowError::SignersLocked {
                status: DocumentStatus::Signing,
                ..
            }
        ));
        assert!(h.client.added_signers().await.is_empty());
        assert_eq!(h.notifier.kinds(), vec![NotificationKind::Error]);
    }

    #[tokio::test]
    async fn test_signers_locked_when_done() {
        let h = harness();
        h.links.set(5, "doc-5").unwrap();
        h.client
            .add_document(fixtures::remote_document("doc-5", "Contract.pdf", "4"))
            .await;

        assert!(matches!(
            h.tracker.signers(5).await,
            Err(WorkflowError::SignersLocked {
                status: DocumentStatus::Done,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_signers_of_unknown_document() {
        let h = harness();
        h.links.set(5, "gone").unwrap();

        let err = h.tracker.signers(5).await.err().unwrap();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_send_to_signers_emits_event() {
        let h = harness();
        h.links.set(1, "doc-1").unwrap();
        h.client
            .add_document(fixtures::remote_document("doc-1", "Contract.pdf", "2"))
            .await;

        h.tracker.send_to_signers(1).await.unwrap();

        assert_eq!(h.client.sent_documents().await, vec!["doc-1".to_string()]);
        assert_eq!(h.events.lock().unwrap().as_slice(), &[HostEvent::DocumentSent]);
    }
}
