use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{SignerForm, SignerRow};
use crate::error::WorkflowError;
use crate::metrics::{self, SIGNER_OPERATIONS};
use crate::notify::{Notification, NotificationSink};
use crate::signing::{RemoteSigner, RemoteSigningClient};

/// Called with the current rows whenever the signer table must be redrawn.
pub type RenderCallback = Arc<dyn Fn(&[SignerRow]) + Send + Sync>;

/// Keeps a local mirror of a document's remote signer list.
///
/// Every add/remove is sent to the signing service first; local state only
/// changes when the service answers 200. Each operation notifies the agent
/// and then re-renders, whatever the outcome.
pub struct SignerManagementWorkflow {
    client: Arc<dyn RemoteSigningClient>,
    notifier: Arc<dyn NotificationSink>,
    document_uuid: String,
    signers: Vec<RemoteSigner>,
    loading: bool,
    on_render: Option<RenderCallback>,
}

impl SignerManagementWorkflow {
    pub fn new(
        client: Arc<dyn RemoteSigningClient>,
        notifier: Arc<dyn NotificationSink>,
        document_uuid: impl Into<String>,
        signers: Vec<RemoteSigner>,
    ) -> Self {
        Self {
            client,
            notifier,
            document_uuid: document_uuid.into(),
            signers,
            loading: false,
            on_render: None,
        }
    }

    /// Seed the mirror from the service's current signer list.
    pub async fn load(
        client: Arc<dyn RemoteSigningClient>,
        notifier: Arc<dyn NotificationSink>,
        document_uuid: impl Into<String>,
    ) -> Result<Self, WorkflowError> {
        let document_uuid = document_uuid.into();
        match client.list_signers(&document_uuid).await {
            Ok(signers) => {
                debug!(
                    "Loaded {} signers for document {}",
                    signers.len(),
                    document_uuid
                );
                Ok(Self::new(client, notifier, document_uuid, signers))
            }
            Err(e) => {
                notifier.notify(Notification::error(
                    "Error",
                    format!("Could not load the document's signers: {}", e),
                ));
                Err(WorkflowError::remote("list signers", &e))
            }
        }
    }

    pub fn with_render_callback(mut self, callback: RenderCallback) -> Self {
        self.on_render = Some(callback);
        self
    }

    pub fn document_uuid(&self) -> &str {
        &self.document_uuid
    }

    pub fn signers(&self) -> &[RemoteSigner] {
        &self.signers
    }

    pub fn rows(&self) -> Vec<SignerRow> {
        SignerRow::project_all(&self.signers)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Register a signer from the form on the active document.
    pub async fn add_signer(&mut self, form: SignerForm) -> Result<RemoteSigner, WorkflowError> {
        let result = self.try_add(form).await;
        SIGNER_OPERATIONS
            .with_label_values(&["add", metrics::result_label(result.is_ok())])
            .inc();

        match &result {
            Ok(signer) => {
                info!("Signer {} added to {}", signer.email, self.document_uuid);
                self.notifier.notify(Notification::success(
                    "Signer added",
                    format!("{} was added as a signer.", signer.email),
                ));
            }
            Err(WorkflowError::InvalidForm(errors)) => {
                self.notifier
                    .notify(Notification::error("Invalid form", errors.to_string()));
            }
            Err(e) => {
                warn!("Failed to add signer to {}: {}", self.document_uuid, e);
                self.notifier
                    .notify(Notification::error("Error adding signer", e.to_string()));
            }
        }

        self.render();
        result
    }

    async fn try_add(&mut self, form: SignerForm) -> Result<RemoteSigner, WorkflowError> {
        let signer = form.into_signer()?;
        let mutation = self
            .client
            .add_signer(&self.document_uuid, &signer.payload())
            .await
            .map_err(|e| WorkflowError::remote("add signer", &e))?;

        if mutation.status != 200 {
            return Err(unexpected_status("add signer", mutation.status));
        }

        // The service echoes the created record; fall back to what was sent.
        let created = mutation.signer.unwrap_or_else(|| RemoteSigner {
            email: signer.email.clone(),
            name: Some(signer.name.clone()),
            document: Some(signer.cpf.clone()),
            type_code: Some(signer.role.action_code().to_string()),
            ..RemoteSigner::default()
        });
        self.signers.push(created.clone());
        Ok(created)
    }

    /// Remove a signer identified by its remote key and email.
    pub async fn remove_signer(&mut self, signer_key: &str, email: &str) -> Result<(), WorkflowError> {
        self.loading = true;

        let outcome = self
            .client
            .remove_signer(&self.document_uuid, signer_key, email)
            .await;
        let result = match outcome {
            Ok(mutation) if mutation.status == 200 => {
                self.signers
                    .retain(|s| s.key_signer.as_deref() != Some(signer_key));
                self.notifier.notify(Notification::success(
                    "Signer removed",
                    format!("{} was removed.", email),
                ));
                Ok(())
            }
            Ok(mutation) => {
                let err = unexpected_status("remove signer", mutation.status);
                self.notifier.notify(Notification::error(
                    "Error removing signer",
                    format!("Could not remove the signer. Status {}.", mutation.status),
                ));
                Err(err)
            }
            Err(e) => {
                warn!("Failed to remove signer {} from {}: {}", email, self.document_uuid, e);
                self.notifier.notify(Notification::error(
                    "Error removing signer",
                    format!("Could not remove the signer {}.", email),
                ));
                Err(WorkflowError::remote("remove signer", &e))
            }
        };

        SIGNER_OPERATIONS
            .with_label_values(&["remove", metrics::result_label(result.is_ok())])
            .inc();

        self.render();
        self.loading = false;
        result
    }

    fn render(&self) {
        if let Some(callback) = &self.on_render {
            callback(&self.rows());
        }
    }
}

fn unexpected_status(operation: &str, status: u16) -> WorkflowError {
    WorkflowError::RemoteCall {
        operation: operation.to_string(),
        message: format!("unexpected status {}", status),
        status: Some(status),
    }
}
