//! Common test utilities for API testing with mocks.
//!
//! Builds the real router over mock helpdesk and signing clients and a
//! file-backed link store, and drives it in-process.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use signdesk_core::{
    testing::{MockHelpdesk, MockSigningClient},
    AttachmentResolver, AuthMethod, Authenticator, SqliteLinkStore,
};

/// Re-export fixtures for test convenience
pub use signdesk_core::testing::fixtures;

/// Test fixture with fully controllable collaborators.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_submit() {
///     let fixture = TestFixture::new();
///     fixture.seed_ticket(42).await;
///
///     let response = fixture.post("/api/v1/tickets/42/document", json!({
///         "document": { "document_name": "Contract", "primary_attachment": 1 }
///     })).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock helpdesk - configure ticket attachments
    pub helpdesk: Arc<MockHelpdesk>,
    /// Mock signing service - inspect uploads, inject failures
    pub signing: Arc<MockSigningClient>,
    /// Link store backing the router
    pub links: Arc<SqliteLinkStore>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a fixture without authentication.
    pub fn new() -> Self {
        Self::with_app_secret(None)
    }

    /// Create a fixture, optionally requiring an app secret.
    pub fn with_app_secret(secret: Option<&str>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let mut config = fixtures::config();
        config.database.path = db_path.clone();
        if let Some(secret) = secret {
            config.auth.method = AuthMethod::AppSecret;
            config.auth.app_secret = Some(secret.to_string());
        }

        let authenticator: Arc<dyn Authenticator> = Arc::from(
            signdesk_core::create_authenticator(&config.auth)
                .expect("Failed to create authenticator"),
        );
        let helpdesk = Arc::new(MockHelpdesk::new());
        let signing = Arc::new(MockSigningClient::new());
        let links =
            Arc::new(SqliteLinkStore::new(&db_path).expect("Failed to create link store"));

        let state = Arc::new(signdesk_server::state::AppState::new(
            config,
            authenticator,
            Arc::new(AttachmentResolver::new(helpdesk.clone())),
            signing.clone(),
            links.clone(),
        ));
        let router = signdesk_server::api::create_router(state);

        Self {
            router,
            helpdesk,
            signing,
            links,
            temp_dir,
        }
    }

    /// Give a ticket two own attachments and one requested-item attachment.
    pub async fn seed_ticket(&self, ticket_id: u64) {
        self.helpdesk
            .set_ticket_attachments(
                ticket_id,
                vec![
                    fixtures::attachment(1, "contrato.pdf"),
                    fixtures::attachment(2, "anexo técnico.pdf"),
                ],
            )
            .await;
        self.helpdesk
            .set_requested_items(
                ticket_id,
                vec![signdesk_core::attachment::RequestedItem {
                    id: 10,
                    attachments: vec![fixtures::attachment(3, "proposta.pdf")],
                }],
            )
            .await;
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, &[]).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), &[]).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None, &[]).await
    }

    /// Send a GET request with extra headers.
    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        self.request("GET", path, None, headers).await
    }

    /// Send a request to the test server.
    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            request_builder = request_builder.header(*name, *value);
        }

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body_bytes).into()))
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
