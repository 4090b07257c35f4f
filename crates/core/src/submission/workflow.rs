use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::{build_filename_with_extension, normalize_filename, DocumentForm};
use crate::attachment::{Attachment, AttachmentId, TicketId};
use crate::error::WorkflowError;
use crate::link::{LinkStore, SetOutcome};
use crate::metrics::{self, LINK_OPERATIONS, SUBMISSIONS_TOTAL, UPLOADS_TOTAL};
use crate::notify::{HostEvent, Notification, NotificationSink};
use crate::signer::{Signer, SignerDraftTable, SignerForm, SignerOrderValidator};
use crate::signing::RemoteSigningClient;

/// Receives host events raised by a workflow.
pub type EventCallback = Arc<dyn Fn(HostEvent) + Send + Sync>;

/// Step of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "index", rename_all = "snake_case")]
pub enum SubmissionPhase {
    Idle,
    UploadingPrimary,
    /// Zero-based position among the selected secondary attachments.
    UploadingSecondary(usize),
    /// Zero-based position among the drafted signers.
    RegisteringSigners(usize),
    PersistingLink,
    Notifying,
    Failed,
}

/// Everything needed for one submission.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub ticket_id: TicketId,
    /// Attachments the form may select from.
    pub attachments: Vec<Attachment>,
    pub form: DocumentForm,
    /// Drafted signers; `None` when signers are managed after creation.
    pub signers: Option<Vec<SignerForm>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecondaryUpload {
    pub attachment_id: AttachmentId,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignerRegistration {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of a submission whose primary upload succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReport {
    pub document_uuid: String,
    pub filename: String,
    pub secondaries: Vec<SecondaryUpload>,
    pub signers: Vec<SignerRegistration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<SetOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_error: Option<String>,
    pub phases: Vec<SubmissionPhase>,
}

impl SubmissionReport {
    pub fn is_complete(&self) -> bool {
        self.partial_failure().is_none()
    }

    /// The follow-up failures, if any step after the primary upload failed.
    pub fn partial_failure(&self) -> Option<WorkflowError> {
        let failed_secondaries: Vec<String> = self
            .secondaries
            .iter()
            .filter(|s| s.error.is_some())
            .map(|s| s.filename.clone())
            .collect();
        let failed_signers: Vec<String> = self
            .signers
            .iter()
            .filter(|s| s.error.is_some())
            .map(|s| s.email.clone())
            .collect();

        if failed_secondaries.is_empty() && failed_signers.is_empty() && self.link_error.is_none()
        {
            return None;
        }

        Some(WorkflowError::PartialSubmission {
            document_uuid: self.document_uuid.clone(),
            failed_secondaries,
            failed_signers,
            link_error: self.link_error.clone(),
        })
    }

    /// `Err(PartialSubmission)` when any follow-up step failed.
    pub fn into_result(self) -> Result<Self, WorkflowError> {
        match self.partial_failure() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }

    pub fn reached(&self, phase: SubmissionPhase) -> bool {
        self.phases.contains(&phase)
    }
}

/// Creates a remote document from ticket attachments.
///
/// Only the primary upload is fatal. Secondary uploads run one at a time with
/// a pause after each, and a failed secondary, signer registration or link
/// write is recorded in the report without stopping the run.
pub struct SubmissionWorkflow {
    signing: Arc<dyn RemoteSigningClient>,
    links: Arc<dyn LinkStore>,
    notifier: Arc<dyn NotificationSink>,
    secondary_delay: Duration,
    on_event: Option<EventCallback>,
}

impl SubmissionWorkflow {
    pub fn new(
        signing: Arc<dyn RemoteSigningClient>,
        links: Arc<dyn LinkStore>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            signing,
            links,
            notifier,
            secondary_delay: Duration::from_millis(2000),
            on_event: None,
        }
    }

    pub fn with_secondary_delay(mut self, delay: Duration) -> Self {
        self.secondary_delay = delay;
        self
    }

    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.on_event = Some(callback);
        self
    }

    /// Run a submission.
    ///
    /// Returns `Err` when nothing was created (invalid input or failed primary
    /// upload). Otherwise returns the report, which may carry partial failures.
    pub async fn submit(
        &self,
        request: SubmissionRequest,
    ) -> Result<SubmissionReport, WorkflowError> {
        let (primary, secondaries, signers) = match Self::validate(&request) {
            Ok(parts) => parts,
            Err(err) => {
                SUBMISSIONS_TOTAL.with_label_values(&["invalid"]).inc();
                self.notifier
                    .notify(Notification::error("Invalid document", err.to_string()));
                return Err(err);
            }
        };

        let mut phases = vec![SubmissionPhase::Idle, SubmissionPhase::UploadingPrimary];
        let filename = build_filename_with_extension(&request.form.document_name, &primary.name);
        info!(
            "Ticket {}: uploading primary attachment {} as {}",
            request.ticket_id, primary.id, filename
        );

        let uploaded = self
            .signing
            .upload_primary(&primary.url, &primary.content_type, &filename)
            .await;
        UPLOADS_TOTAL
            .with_label_values(&["primary", metrics::result_label(uploaded.is_ok())])
            .inc();

        let document_uuid = match uploaded {
            Ok(uploaded) => uploaded.uuid,
            Err(e) => {
                phases.push(SubmissionPhase::Failed);
                error!(
                    "Ticket {}: primary upload failed: {} (phases {:?})",
                    request.ticket_id, e, phases
                );
                SUBMISSIONS_TOTAL.with_label_values(&["failed"]).inc();
                self.notifier.notify(Notification::error(
                    "Something went wrong",
                    format!("Error sending the primary document: {}", e),
                ));
                return Err(WorkflowError::FatalSubmission {
                    message: e.to_string(),
                });
            }
        };
        info!("Ticket {}: document {} created", request.ticket_id, document_uuid);

        let mut report = SubmissionReport {
            document_uuid,
            filename,
            secondaries: Vec::with_capacity(secondaries.len()),
            signers: Vec::with_capacity(signers.len()),
            link: None,
            link_error: None,
            phases,
        };

        self.upload_secondaries(&mut report, &secondaries).await;
        self.register_signers(&mut report, &signers).await;

        report.phases.push(SubmissionPhase::PersistingLink);
        match self.links.set(request.ticket_id, &report.document_uuid) {
            Ok(outcome) => {
                LINK_OPERATIONS.with_label_values(&["set", "success"]).inc();
                debug!(
                    "Ticket {} linked to {} ({:?})",
                    request.ticket_id, report.document_uuid, outcome
                );
                report.link = Some(outcome);
            }
            Err(e) => {
                LINK_OPERATIONS.with_label_values(&["set", "failure"]).inc();
                warn!(
                    "Ticket {}: document {} created but not linked: {}",
                    request.ticket_id, report.document_uuid, e
                );
                report.link_error = Some(e.to_string());
            }
        }

        report.phases.push(SubmissionPhase::Notifying);
        match report.partial_failure() {
            None => {
                SUBMISSIONS_TOTAL.with_label_values(&["complete"]).inc();
                self.notifier.notify(Notification::success(
                    "Document created",
                    format!(
                        "{} is ready to receive signatures",
                        request.form.document_name.trim()
                    ),
                ));
            }
            Some(partial) => {
                SUBMISSIONS_TOTAL.with_label_values(&["partial"]).inc();
                self.notifier.notify(Notification::warning(
                    "Document created with problems",
                    partial.to_string(),
                ));
            }
        }

        // The document exists either way, so the host must refresh.
        self.emit(HostEvent::DocumentCreated);
        report.phases.push(SubmissionPhase::Idle);
        Ok(report)
    }

    /// Check the form and signer drafts before any remote call.
    fn validate(
        request: &SubmissionRequest,
    ) -> Result<(&Attachment, Vec<&Attachment>, Vec<Signer>), WorkflowError> {
        let (primary, secondaries) = request.form.resolve(&request.attachments)?;

        let signers = match &request.signers {
            None => Vec::new(),
            Some(forms) => {
                SignerOrderValidator::validate_forms(forms)?;
                let mut signers = SignerDraftTable::from_forms(forms.clone())?.into_signers();
                signers.sort_by_key(|s| s.order);
                signers
            }
        };

        Ok((primary, secondaries, signers))
    }

    async fn upload_secondaries(&self, report: &mut SubmissionReport, secondaries: &[&Attachment]) {
        for (index, attachment) in secondaries.iter().enumerate() {
            report.phases.push(SubmissionPhase::UploadingSecondary(index));
            let filename = normalize_filename(&attachment.name);
            debug!(
                "Document {}: uploading secondary {} as {}",
                report.document_uuid, attachment.id, filename
            );

            let result = self
                .signing
                .upload_secondary(&attachment.url, &filename, &report.document_uuid)
                .await;
            UPLOADS_TOTAL
                .with_label_values(&["secondary", metrics::result_label(result.is_ok())])
                .inc();

            let error = match result {
                Ok(()) => None,
                Err(e) => {
                    warn!(
                        "Document {}: secondary {} failed: {}",
                        report.document_uuid, attachment.name, e
                    );
                    Some(e.to_string())
                }
            };
            report.secondaries.push(SecondaryUpload {
                attachment_id: attachment.id,
                filename,
                error,
            });

            if !self.secondary_delay.is_zero() {
                tokio::time::sleep(self.secondary_delay).await;
            }
        }
    }

    async fn register_signers(&self, report: &mut SubmissionReport, signers: &[Signer]) {
        for (index, signer) in signers.iter().enumerate() {
            report.phases.push(SubmissionPhase::RegisteringSigners(index));

            let result = self
                .signing
                .add_signer(&report.document_uuid, &signer.payload())
                .await;
            let registration = match result {
                Ok(mutation) if mutation.status == 200 => SignerRegistration {
                    email: signer.email.clone(),
                    remote_key: mutation.signer.and_then(|s| s.key_signer),
                    error: None,
                },
                Ok(mutation) => SignerRegistration {
                    email: signer.email.clone(),
                    remote_key: None,
                    error: Some(format!("unexpected status {}", mutation.status)),
                },
                Err(e) => SignerRegistration {
                    email: signer.email.clone(),
                    remote_key: None,
                    error: Some(e.to_string()),
                },
            };

            if let Some(error) = &registration.error {
                warn!(
                    "Document {}: signer {} not added: {}",
                    report.document_uuid, signer.email, error
                );
            }
            metrics::SIGNER_OPERATIONS
                .with_label_values(&["add", metrics::result_label(registration.error.is_none())])
                .inc();
            report.signers.push(registration);
        }
    }

    fn emit(&self, event: HostEvent) {
        if let Some(callback) = &self.on_event {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::form::FieldValue;
    use crate::link::{LinkStore, SqliteLinkStore};
    use crate::notify::NotificationKind;
    use crate::signing::SigningError;
    use crate::testing::{fixtures, MockLinkStore, MockSigningClient, RecordingNotifier};

    struct Harness {
        client: Arc<MockSigningClient>,
        links: Arc<SqliteLinkStore>,
        notifier: Arc<RecordingNotifier>,
        events: Arc<Mutex<Vec<HostEvent>>>,
        workflow: SubmissionWorkflow,
    }

    fn harness() -> Harness {
        let client = Arc::new(MockSigningClient::new());
        let links = Arc::new(SqliteLinkStore::in_memory().unwrap());
        let notifier = Arc::new(RecordingNotifier::new());
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let workflow = SubmissionWorkflow::new(client.clone(), links.clone(), notifier.clone())
            .with_secondary_delay(Duration::ZERO)
            .with_event_callback(Arc::new(move |event| sink.lock().unwrap().push(event)));
        Harness {
            client,
            links,
            notifier,
            events,
            workflow,
        }
    }

    fn request(secondaries: Vec<AttachmentId>) -> SubmissionRequest {
        SubmissionRequest {
            ticket_id: 77,
            attachments: vec![
                fixtures::attachment(1, "original.PDF"),
                fixtures::attachment(2, "Anexo Ação.pdf"),
                fixtures::attachment(3, "b.pdf"),
                fixtures::attachment(4, "c.pdf"),
            ],
            form: DocumentForm {
                document_name: "Contract Jan ".to_string(),
                primary_attachment: Some(1),
                secondary_attachments: secondaries,
            },
            signers: None,
        }
    }

    fn signer_form(email: &str, order: i64) -> SignerForm {
        SignerForm {
            signatory_name: "Signer".to_string(),
            signatory_cpf: "12345678909".to_string(),
            signatory_email: email.to_string(),
            signatory_type: "1".to_string(),
            signature_type: "normal".to_string(),
            signature_certificate: None,
            signatory_order: Some(FieldValue::Number(order)),
        }
    }

    #[tokio::test]
    async fn test_full_success() {
        let h = harness();

        let report = h.workflow.submit(request(vec![2, 3])).await.unwrap();

        assert!(report.is_complete());
        assert_eq!(report.filename, "Contract Jan.PDF");
        assert_eq!(h.client.primary_uploads().await[0].filename, "Contract Jan.PDF");
        assert_eq!(
            h.client
                .secondary_uploads()
                .await
                .iter()
                .map(|u| u.filename.as_str())
                .collect::<Vec<_>>(),
            vec!["Anexo_Acao.pdf", "b.pdf"]
        );
        assert_eq!(
            h.links.get(77).unwrap().unwrap().document_uuid,
            report.document_uuid
        );
        assert_eq!(report.link, Some(SetOutcome::Created));
        assert_eq!(h.notifier.kinds(), vec![NotificationKind::Success]);
        assert_eq!(h.events.lock().unwrap().as_slice(), &[HostEvent::DocumentCreated]);
        assert_eq!(report.phases.last(), Some(&SubmissionPhase::Idle));
    }

    #[tokio::test]
    async fn test_link_failure_keeps_document() {
        let client = Arc::new(MockSigningClient::new());
        let links = Arc::new(MockLinkStore::new());
        links.fail_writes("disk full");
        let notifier = Arc::new(RecordingNotifier::new());
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let workflow = SubmissionWorkflow::new(client.clone(), links.clone(), notifier.clone())
            .with_secondary_delay(Duration::ZERO)
            .with_event_callback(Arc::new(move |event| sink.lock().unwrap().push(event)));

        let report = workflow.submit(request(vec![2])).await.unwrap();

        assert_eq!(client.primary_uploads().await.len(), 1);
        assert!(client.document(&report.document_uuid).await.is_some());
        assert_eq!(report.link, None);
        assert_eq!(report.link_error.as_deref(), Some("Database error: disk full"));
        assert!(links.is_empty());
        assert_eq!(notifier.kinds(), vec![NotificationKind::Warning]);
        assert_eq!(events.lock().unwrap().as_slice(), &[HostEvent::DocumentCreated]);
        assert!(matches!(
            report.into_result(),
            Err(WorkflowError::PartialSubmission { link_error: Some(_), .. })
        ));
    }

    #[tokio::test]
    async fn test_secondary_failure_is_not_fatal() {
        let h = harness();
        h.client.fail_secondary_upload(1).await;

        let report = h.workflow.submit(request(vec![2, 3, 4])).await.unwrap();

        assert_eq!(h.client.secondary_uploads().await.len(), 3);
        assert!(report.secondaries[1].error.is_some());
        assert!(report.secondaries[2].error.is_none());
        assert!(report.reached(SubmissionPhase::PersistingLink));
        assert!(h.links.get(77).unwrap().is_some());
        assert_eq!(h.notifier.kinds(), vec![NotificationKind::Warning]);
        assert!(matches!(
            report.into_result(),
            Err(WorkflowError::PartialSubmission { ref failed_secondaries, .. })
                if failed_secondaries == &vec!["b.pdf".to_string()]
        ));
    }

    #[tokio::test]
    async fn test_primary_failure_aborts() {
        let h = harness();
        h.client
            .set_next_error(SigningError::Api {
                status: 500,
                message: "storage unavailable".to_string(),
            })
            .await;

        let err = h.workflow.submit(request(vec![2])).await.unwrap_err();

        assert!(matches!(err, WorkflowError::FatalSubmission { .. }));
        assert!(h.client.secondary_uploads().await.is_empty());
        assert!(h.links.get(77).unwrap().is_none());
        let notifications = h.notifier.notifications();
        assert_eq!(notifications[0].kind, NotificationKind::Error);
        assert!(notifications[0].message.contains("storage unavailable"));
        assert!(h.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_form_makes_no_calls() {
        let h = harness();
        let mut req = request(vec![]);
        req.form.document_name = "  ".to_string();

        let err = h.workflow.submit(req).await.unwrap_err();

        assert!(err.is_validation());
        assert!(h.client.primary_uploads().await.is_empty());
        assert_eq!(h.notifier.kinds(), vec![NotificationKind::Error]);
    }

    #[tokio::test]
    async fn test_signer_gap_aborts_before_upload() {
        let h = harness();
        let mut req = request(vec![]);
        req.signers = Some(vec![signer_form("a@acme.com", 1), signer_form("b@acme.com", 3)]);

        let err = h.workflow.submit(req).await.unwrap_err();

        assert!(matches!(err, WorkflowError::InvalidSigners(_)));
        assert!(h.client.primary_uploads().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_signer_table_rejected() {
        let h = harness();
        let mut req = request(vec![]);
        req.signers = Some(vec![]);

        assert!(matches!(
            h.workflow.submit(req).await,
            Err(WorkflowError::InvalidSigners(_))
        ));
    }

    #[tokio::test]
    async fn test_signers_registered_in_order() {
        let h = harness();
        let mut req = request(vec![]);
        req.signers = Some(vec![signer_form("b@acme.com", 2), signer_form("a@acme.com", 1)]);

        let report = h.workflow.submit(req).await.unwrap();

        let emails: Vec<String> = h
            .client
            .added_signers()
            .await
            .into_iter()
            .map(|(_, payload)| payload.email)
            .collect();
        assert_eq!(emails, vec!["a@acme.com", "b@acme.com"]);
        assert!(report.reached(SubmissionPhase::RegisteringSigners(1)));
        assert!(report.signers.iter().all(|s| s.remote_key.is_some()));
    }

    #[tokio::test]
    async fn test_existing_link_is_updated() {
        let h = harness();
        h.links.set(77, "old-doc").unwrap();

        let report = h.workflow.submit(request(vec![])).await.unwrap();

        assert_eq!(report.link, Some(SetOutcome::Updated));
    }
}
