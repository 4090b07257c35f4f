use std::sync::Arc;
use std::time::Duration;

use signdesk_core::{
    signing::SendOptions, Authenticator, Config, DocumentTracker, LinkStore, NotificationSink,
    RemoteSigningClient, SanitizedConfig, SubmissionWorkflow, TicketAttachmentSource,
};
use signdesk_core::submission::EventCallback;

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    attachments: Arc<dyn TicketAttachmentSource>,
    signing: Arc<dyn RemoteSigningClient>,
    links: Arc<dyn LinkStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        attachments: Arc<dyn TicketAttachmentSource>,
        signing: Arc<dyn RemoteSigningClient>,
        links: Arc<dyn LinkStore>,
    ) -> Self {
        Self {
            config,
            authenticator,
            attachments,
            signing,
            links,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn attachments(&self) -> &dyn TicketAttachmentSource {
        self.attachments.as_ref()
    }

    pub fn signing(&self) -> Arc<dyn RemoteSigningClient> {
        Arc::clone(&self.signing)
    }

    pub fn links(&self) -> Arc<dyn LinkStore> {
        Arc::clone(&self.links)
    }

    /// Submission workflow reporting to the given sink.
    pub fn submission_workflow(
        &self,
        notifier: Arc<dyn NotificationSink>,
        on_event: EventCallback,
    ) -> SubmissionWorkflow {
        SubmissionWorkflow::new(self.signing(), self.links(), notifier)
            .with_secondary_delay(Duration::from_millis(
                self.config.submission.secondary_upload_delay_ms,
            ))
            .with_event_callback(on_event)
    }

    /// Document tracker reporting to the given sink.
    pub fn document_tracker(
        &self,
        notifier: Arc<dyn NotificationSink>,
        on_event: EventCallback,
    ) -> DocumentTracker {
        DocumentTracker::new(self.signing(), self.links(), notifier)
            .with_send_options(SendOptions {
                skip_email: self.config.submission.skip_signer_email,
                workflow: self.config.submission.signing_workflow,
                message: String::new(),
            })
            .with_event_callback(on_event)
    }
}
