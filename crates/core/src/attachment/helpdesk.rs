//! Helpdesk REST API client (Freshservice v2).
//!
//! Authenticates with basic auth: the API key as user name, "X" as password.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{FetchError, HelpdeskApi, RequestedItem, TicketDetail, TicketId};
use crate::config::HelpdeskConfig;

/// Helpdesk API client.
pub struct HelpdeskClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct TicketEnvelope {
    ticket: TicketDetail,
}

#[derive(Deserialize)]
struct RequestedItemsEnvelope {
    #[serde(default)]
    requested_items: Vec<RequestedItem>,
}

impl HelpdeskClient {
    /// Create a new helpdesk client.
    pub fn new(config: &HelpdeskConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url_for(&config.domain),
            api_key: config.api_key.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Helpdesk GET {}", url);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.api_key, Some("X"))
            .send()
            .await?;

        parse_response(response).await
    }
}

/// Accepts a bare domain or a full URL (useful against local test servers).
fn base_url_for(domain: &str) -> String {
    let domain = domain.trim_end_matches('/');
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{}", domain)
    }
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, FetchError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| FetchError::Parse(e.to_string()))
}

#[async_trait]
impl HelpdeskApi for HelpdeskClient {
    async fn ticket(&self, ticket_id: TicketId) -> Result<TicketDetail, FetchError> {
        let envelope: TicketEnvelope = self
            .get_json(&format!("/api/v2/tickets/{}", ticket_id))
            .await?;
        Ok(envelope.ticket)
    }

    async fn requested_items(&self, ticket_id: TicketId) -> Result<Vec<RequestedItem>, FetchError> {
        let envelope: RequestedItemsEnvelope = self
            .get_json(&format!("/api/v2/tickets/{}/requested_items", ticket_id))
            .await?;
        Ok(envelope.requested_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_from_domain() {
        assert_eq!(
            base_url_for("acme.freshservice.com"),
            "https://acme.freshservice.com"
        );
        assert_eq!(
            base_url_for("http://127.0.0.1:9000/"),
            "http://127.0.0.1:9000"
        );
    }

    #[test]
    fn test_envelopes_deserialize() {
        let ticket: TicketEnvelope = serde_json::from_str(
            r#"{"ticket":{"id":12,"subject":"Contract","attachments":[
                {"id":1,"name":"a.pdf","attachment_url":"https://f/1","content_type":"application/pdf","size":10}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(ticket.ticket.attachments.len(), 1);

        let items: RequestedItemsEnvelope =
            serde_json::from_str(r#"{"requested_items":[{"id":3},{"id":4,"attachments":[]}]}"#)
                .unwrap();
        assert_eq!(items.requested_items.len(), 2);
        assert!(items.requested_items[0].attachments.is_empty());
    }

    #[test]
    fn test_client_builds_from_config() {
        let client = HelpdeskClient::new(&HelpdeskConfig {
            domain: "acme.freshservice.com".to_string(),
            api_key: "key".to_string(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(client.base_url, "https://acme.freshservice.com");
    }
}
