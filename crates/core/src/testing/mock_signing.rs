//! Mock signing service for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::signing::{
    DocumentStatus, RemoteDocument, RemoteSigner, RemoteSigningClient, SendOptions,
    SignerMutation, SignerPayload, SigningError, UploadedDocument,
};

/// A recorded file upload for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    pub source_url: String,
    pub filename: String,
    /// Primary uploads: the MIME type sent. Secondary uploads: empty.
    pub mime_type: String,
    /// Document the file was appended to; for primaries, the created one.
    pub document_uuid: String,
    pub success: bool,
}

/// Mock implementation of [`RemoteSigningClient`].
///
/// Primary uploads create documents (status "2") that later lookups see.
/// Signers added through the mock show up in `list_signers`.
///
/// # Example
///
/// ```rust,ignore
/// use signdesk_core::testing::MockSigningClient;
///
/// let client = MockSigningClient::new();
/// client.fail_secondary_upload(1).await;
///
/// // Submit through a workflow...
///
/// let uploads = client.secondary_uploads().await;
/// assert!(!uploads[1].success);
/// ```
#[derive(Debug)]
pub struct MockSigningClient {
    documents: Arc<RwLock<HashMap<String, RemoteDocument>>>,
    signers: Arc<RwLock<HashMap<String, Vec<RemoteSigner>>>>,
    primary_uploads: Arc<RwLock<Vec<RecordedUpload>>>,
    secondary_uploads: Arc<RwLock<Vec<RecordedUpload>>>,
    added_signers: Arc<RwLock<Vec<(String, SignerPayload)>>>,
    removed_signers: Arc<RwLock<Vec<(String, String, String)>>>,
    sent_documents: Arc<RwLock<Vec<String>>>,
    /// If set, the next call of any kind fails with this error.
    next_error: Arc<RwLock<Option<SigningError>>>,
    /// Zero-based secondary upload calls that fail.
    failing_secondaries: Arc<RwLock<Vec<usize>>>,
    add_status: Arc<RwLock<u16>>,
    remove_status: Arc<RwLock<u16>>,
    /// Cancel calls leave the document status untouched.
    cancel_pending: Arc<RwLock<bool>>,
    counter: Arc<RwLock<u64>>,
}

impl Default for MockSigningClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSigningClient {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
            signers: Arc::new(RwLock::new(HashMap::new())),
            primary_uploads: Arc::new(RwLock::new(Vec::new())),
            secondary_uploads: Arc::new(RwLock::new(Vec::new())),
            added_signers: Arc::new(RwLock::new(Vec::new())),
            removed_signers: Arc::new(RwLock::new(Vec::new())),
            sent_documents: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            failing_secondaries: Arc::new(RwLock::new(Vec::new())),
            add_status: Arc::new(RwLock::new(200)),
            remove_status: Arc::new(RwLock::new(200)),
            cancel_pending: Arc::new(RwLock::new(false)),
            counter: Arc::new(RwLock::new(0)),
        }
    }

    /// Make a document known to the service.
    pub async fn add_document(&self, document: RemoteDocument) {
        self.documents
            .write()
            .await
            .insert(document.uuid.clone(), document);
    }

    pub async fn document(&self, uuid: &str) -> Option<RemoteDocument> {
        self.documents.read().await.get(uuid).cloned()
    }

    /// Set the signer list of a document.
    pub async fn set_signers(&self, document_uuid: &str, signers: Vec<RemoteSigner>) {
        self.signers
            .write()
            .await
            .insert(document_uuid.to_string(), signers);
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: SigningError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make the `index`-th secondary upload call (zero-based) fail.
    pub async fn fail_secondary_upload(&self, index: usize) {
        self.failing_secondaries.write().await.push(index);
    }

    /// Status returned by `add_signer` (default 200).
    pub async fn set_add_status(&self, status: u16) {
        *self.add_status.write().await = status;
    }

    /// Status returned by `remove_signer` (default 200).
    pub async fn set_remove_status(&self, status: u16) {
        *self.remove_status.write().await = status;
    }

    /// Make `cancel_document` acknowledge without canceling yet.
    pub async fn set_cancel_pending(&self, pending: bool) {
        *self.cancel_pending.write().await = pending;
    }

    pub async fn primary_uploads(&self) -> Vec<RecordedUpload> {
        self.primary_uploads.read().await.clone()
    }

    pub async fn secondary_uploads(&self) -> Vec<RecordedUpload> {
        self.secondary_uploads.read().await.clone()
    }

    /// `(document_uuid, payload)` per add call.
    pub async fn added_signers(&self) -> Vec<(String, SignerPayload)> {
        self.added_signers.read().await.clone()
    }

    /// `(document_uuid, signer_key, email)` per remove call.
    pub async fn removed_signers(&self) -> Vec<(String, String, String)> {
        self.removed_signers.read().await.clone()
    }

    pub async fn sent_documents(&self) -> Vec<String> {
        self.sent_documents.read().await.clone()
    }

    async fn take_error(&self) -> Option<SigningError> {
        self.next_error.write().await.take()
    }

    async fn next_id(&self) -> u64 {
        let mut counter = self.counter.write().await;
        *counter += 1;
        *counter
    }

    async fn find_document(&self, uuid: &str) -> Result<RemoteDocument, SigningError> {
        self.documents
            .read()
            .await
            .get(uuid)
            .cloned()
            .ok_or_else(|| SigningError::NotFound(format!("/api/v1/documents/{}", uuid)))
    }
}

#[async_trait]
impl RemoteSigningClient for MockSigningClient {
    async fn upload_primary(
        &self,
        source_url: &str,
        mime_type: &str,
        filename: &str,
    ) -> Result<UploadedDocument, SigningError> {
        let mut record = RecordedUpload {
            source_url: source_url.to_string(),
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
            document_uuid: String::new(),
            success: false,
        };

        if let Some(err) = self.take_error().await {
            self.primary_uploads.write().await.push(record);
            return Err(err);
        }

        let uuid = format!("doc-{}", self.next_id().await);
        self.add_document(RemoteDocument {
            uuid: uuid.clone(),
            name: filename.to_string(),
            status: DocumentStatus::ReadyToSign,
            status_code: "2".to_string(),
            status_label: "Waiting for signers".to_string(),
        })
        .await;

        record.document_uuid = uuid.clone();
        record.success = true;
        self.primary_uploads.write().await.push(record);
        Ok(UploadedDocument { uuid })
    }

    async fn upload_secondary(
        &self,
        source_url: &str,
        filename: &str,
        document_uuid: &str,
    ) -> Result<(), SigningError> {
        let index = self.secondary_uploads.read().await.len();
        let scripted_failure = self.failing_secondaries.read().await.contains(&index);
        let error = match self.take_error().await {
            Some(err) => Some(err),
            None if scripted_failure => Some(SigningError::Api {
                status: 500,
                message: format!("upload of {} rejected", filename),
            }),
            None => None,
        };

        self.secondary_uploads.write().await.push(RecordedUpload {
            source_url: source_url.to_string(),
            filename: filename.to_string(),
            mime_type: String::new(),
            document_uuid: document_uuid.to_string(),
            success: error.is_none(),
        });

        match error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn add_signer(
        &self,
        document_uuid: &str,
        payload: &SignerPayload,
    ) -> Result<SignerMutation, SigningError> {
        self.added_signers
            .write()
            .await
            .push((document_uuid.to_string(), payload.clone()));

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let status = *self.add_status.read().await;
        if status != 200 {
            return Ok(SignerMutation {
                status,
                signer: None,
            });
        }

        let signer = RemoteSigner {
            key_signer: Some(format!("key-{}", self.next_id().await)),
            email: payload.email.clone(),
            type_code: Some(payload.act.clone()),
            certificate_flag: Some(payload.certificate.clone()),
            ..RemoteSigner::default()
        };
        self.signers
            .write()
            .await
            .entry(document_uuid.to_string())
            .or_default()
            .push(signer.clone());

        Ok(SignerMutation {
            status,
            signer: Some(signer),
        })
    }

    async fn remove_signer(
        &self,
        document_uuid: &str,
        signer_key: &str,
        email: &str,
    ) -> Result<SignerMutation, SigningError> {
        self.removed_signers.write().await.push((
            document_uuid.to_string(),
            signer_key.to_string(),
            email.to_string(),
        ));

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let status = *self.remove_status.read().await;
        if status == 200 {
            if let Some(list) = self.signers.write().await.get_mut(document_uuid) {
                list.retain(|s| s.key_signer.as_deref() != Some(signer_key));
            }
        }

        Ok(SignerMutation {
            status,
            signer: None,
        })
    }

    async fn list_signers(&self, document_uuid: &str) -> Result<Vec<RemoteSigner>, SigningError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(self
            .signers
            .read()
            .await
            .get(document_uuid)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_document(&self, document_uuid: &str) -> Result<RemoteDocument, SigningError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.find_document(document_uuid).await
    }

    async fn cancel_document(&self, document_uuid: &str) -> Result<RemoteDocument, SigningError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let mut documents = self.documents.write().await;
        let document = documents.get_mut(document_uuid).ok_or_else(|| {
            SigningError::NotFound(format!("/api/v1/documents/{}", document_uuid))
        })?;
        if *self.cancel_pending.read().await {
            return Ok(document.clone());
        }
        document.status = DocumentStatus::Canceled;
        document.status_code = "6".to_string();
        document.status_label = "Canceled".to_string();
        Ok(document.clone())
    }

    async fn send_to_signers(
        &self,
        document_uuid: &str,
        _options: &SendOptions,
    ) -> Result<(), SigningError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.find_document(document_uuid).await?;

        self.sent_documents
            .write()
            .await
            .push(document_uuid.to_string());

        let mut documents = self.documents.write().await;
        if let Some(document) = documents.get_mut(document_uuid) {
            document.status = DocumentStatus::Signing;
            document.status_code = "3".to_string();
            document.status_label = "Signing".to_string();
        }
        Ok(())
    }
}
