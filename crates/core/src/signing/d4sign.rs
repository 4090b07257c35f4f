//! D4Sign REST API client.
//!
//! Every call carries the `tokenAPI` and `cryptKey` query credentials.
//! Attachment files are streamed from their helpdesk URL straight into the
//! multipart upload body.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{multipart, Body, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{
    RemoteDocument, RemoteSigner, RemoteSigningClient, SendOptions, SignerMutation,
    SignerPayload, SigningError, UploadedDocument,
};
use crate::config::SigningConfig;
use crate::metrics;

const SERVICE: &str = "d4sign";

/// D4Sign client implementation.
pub struct D4SignClient {
    client: Client,
    config: SigningConfig,
}

#[derive(Deserialize)]
struct UploadResponse {
    uuid: String,
}

#[derive(Deserialize)]
struct CreateListResponse {
    #[serde(default)]
    message: Vec<RemoteSigner>,
}

#[derive(Deserialize)]
struct SignerListEntry {
    #[serde(default)]
    list: Vec<RemoteSigner>,
}

impl D4SignClient {
    pub fn new(config: &SigningConfig) -> Result<Self, SigningError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn document_url(&self, document_uuid: &str, action: &str) -> String {
        if action.is_empty() {
            format!("{}/api/v1/documents/{}", self.base_url(), document_uuid)
        } else {
            format!(
                "{}/api/v1/documents/{}/{}",
                self.base_url(),
                document_uuid,
                action
            )
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.query(&[
            ("tokenAPI", self.config.token_api.as_str()),
            ("cryptKey", self.config.crypt_key.as_str()),
        ])
    }

    /// Send a request, recording duration and outcome.
    async fn send(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<Response, SigningError> {
        let started = Instant::now();
        let result = self.authorized(request).send().await;

        let result = match result {
            Ok(response) => check_status(response).await,
            Err(e) => Err(SigningError::from(e)),
        };
        metrics::observe_external_call(SERVICE, operation, started, result.is_ok());
        result
    }

    /// Open the attachment source as a streaming body.
    async fn source_body(&self, source_url: &str) -> Result<Body, SigningError> {
        let response = self
            .client
            .get(source_url)
            .send()
            .await
            .map_err(|e| SigningError::SourceDownload {
                url: source_url.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(SigningError::SourceDownload {
                url: source_url.to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }

        Ok(Body::wrap_stream(response.bytes_stream()))
    }

    async fn upload(
        &self,
        operation: &str,
        url: String,
        source_url: &str,
        mime_type: Option<&str>,
        filename: &str,
    ) -> Result<Response, SigningError> {
        let body = self.source_body(source_url).await?;
        let mut part = multipart::Part::stream(body).file_name(filename.to_string());
        if let Some(mime) = mime_type.filter(|m| !m.is_empty()) {
            part = part.mime_str(mime)?;
        }
        let form = multipart::Form::new().part("file", part);

        debug!("D4Sign {}: {} -> {}", operation, filename, url);
        self.send(operation, self.client.post(&url).multipart(form))
            .await
    }
}

async fn check_status(response: Response) -> Result<Response, SigningError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    if status.as_u16() == 404 {
        return Err(SigningError::NotFound(url));
    }
    Err(SigningError::Api {
        status: status.as_u16(),
        message: body,
    })
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, SigningError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| SigningError::Parse(format!("{}: {}", e, text)))
}

/// Document endpoints answer with a one-element array.
async fn parse_document(response: Response) -> Result<RemoteDocument, SigningError> {
    let documents: Vec<RemoteDocument> = parse_json(response).await?;
    documents
        .into_iter()
        .next()
        .ok_or_else(|| SigningError::Parse("empty document response".to_string()))
}

#[async_trait]
impl RemoteSigningClient for D4SignClient {
    async fn upload_primary(
        &self,
        source_url: &str,
        mime_type: &str,
        filename: &str,
    ) -> Result<UploadedDocument, SigningError> {
        let url = self.document_url(&self.config.safe_uuid, "upload");
        let response = self
            .upload("upload", url, source_url, Some(mime_type), filename)
            .await?;
        let uploaded: UploadResponse = parse_json(response).await?;
        Ok(UploadedDocument {
            uuid: uploaded.uuid,
        })
    }

    async fn upload_secondary(
        &self,
        source_url: &str,
        filename: &str,
        document_uuid: &str,
    ) -> Result<(), SigningError> {
        let url = self.document_url(document_uuid, "uploadslave");
        self.upload("uploadslave", url, source_url, None, filename)
            .await?;
        Ok(())
    }

    async fn add_signer(
        &self,
        document_uuid: &str,
        payload: &SignerPayload,
    ) -> Result<SignerMutation, SigningError> {
        let url = self.document_url(document_uuid, "createlist");
        let response = self
            .send(
                "createlist",
                self.client.post(&url).json(&json!({ "signers": [payload] })),
            )
            .await?;

        let status = response.status().as_u16();
        let created: CreateListResponse = parse_json(response).await?;
        Ok(SignerMutation {
            status,
            signer: created.message.into_iter().next(),
        })
    }

    async fn remove_signer(
        &self,
        document_uuid: &str,
        signer_key: &str,
        email: &str,
    ) -> Result<SignerMutation, SigningError> {
        let url = self.document_url(document_uuid, "removeemaillist");
        let body = json!({ "email-signer": email, "key-signer": signer_key });
        let response = self
            .send("removeemaillist", self.client.post(&url).json(&body))
            .await?;

        Ok(SignerMutation {
            status: response.status().as_u16(),
            signer: None,
        })
    }

    async fn list_signers(&self, document_uuid: &str) -> Result<Vec<RemoteSigner>, SigningError> {
        let url = self.document_url(document_uuid, "list");
        let response = self.send("list", self.client.get(&url)).await?;
        let entries: Vec<SignerListEntry> = parse_json(response).await?;
        Ok(entries
            .into_iter()
            .next()
            .map(|entry| entry.list)
            .unwrap_or_default())
    }

    async fn get_document(&self, document_uuid: &str) -> Result<RemoteDocument, SigningError> {
        let url = self.document_url(document_uuid, "");
        let response = self.send("document", self.client.get(&url)).await?;
        parse_document(response).await
    }

    async fn cancel_document(&self, document_uuid: &str) -> Result<RemoteDocument, SigningError> {
        let url = self.document_url(document_uuid, "cancel");
        let response = self
            .send(
                "cancel",
                self.client.post(&url).json(&json!({ "comment": "" })),
            )
            .await?;
        parse_document(response).await
    }

    async fn send_to_signers(
        &self,
        document_uuid: &str,
        options: &SendOptions,
    ) -> Result<(), SigningError> {
        let url = self.document_url(document_uuid, "sendtosigner");
        let body = json!({
            "message": options.message,
            "skip_email": if options.skip_email { "1" } else { "0" },
            "workflow": options.workflow.as_flag(),
        });
        self.send("sendtosigner", self.client.post(&url).json(&body))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> D4SignClient {
        D4SignClient::new(&SigningConfig {
            base_url: base_url.to_string(),
            token_api: "token".to_string(),
            crypt_key: "crypt".to_string(),
            safe_uuid: "safe-1".to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_document_urls() {
        let client = client("https://sandbox.d4sign.com.br/");
        assert_eq!(
            client.document_url("doc-1", "uploadslave"),
            "https://sandbox.d4sign.com.br/api/v1/documents/doc-1/uploadslave"
        );
        assert_eq!(
            client.document_url("doc-1", ""),
            "https://sandbox.d4sign.com.br/api/v1/documents/doc-1"
        );
    }

    #[test]
    fn test_credentials_added_as_query() {
        let client = client("https://sandbox.d4sign.com.br");
        let request = client
            .authorized(client.client.get(client.document_url("doc-1", "list")))
            .build()
            .unwrap();
        let query = request.url().query().unwrap();
        assert!(query.contains("tokenAPI=token"));
        assert!(query.contains("cryptKey=crypt"));
    }

    #[test]
    fn test_signer_list_shape() {
        let entries: Vec<SignerListEntry> = serde_json::from_str(
            r#"[{"uuidDoc":"d","list":[{"key_signer":"k1","email":"a@b.com","type":"2"}]}]"#,
        )
        .unwrap();
        assert_eq!(entries[0].list.len(), 1);
        assert_eq!(entries[0].list[0].type_code.as_deref(), Some("2"));
    }

    #[test]
    fn test_create_list_shape() {
        let created: CreateListResponse = serde_json::from_str(
            r#"{"message":[{"key_signer":"k9","email":"new@b.com"}]}"#,
        )
        .unwrap();
        assert_eq!(created.message[0].key_signer.as_deref(), Some("k9"));
    }
}
