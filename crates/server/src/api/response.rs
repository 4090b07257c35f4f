//! Per-request workflow context and the JSON envelopes handlers return.

use std::sync::{Arc, Mutex};

use axum::{http::StatusCode, Json};
use serde::Serialize;
use signdesk_core::{
    submission::EventCallback, CollectingNotifier, HostEvent, LinkError, Notification,
    NotificationSink, ValidationErrors, WorkflowError,
};

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Field name to message, for rejected forms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<ValidationErrors>,
    pub notifications: Vec<Notification>,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Successful workflow result plus what the workflow told the user.
#[derive(Debug, Serialize)]
pub struct WorkflowResponse<T> {
    pub data: T,
    pub notifications: Vec<Notification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<&'static str>,
}

/// Collects notifications and host events raised while serving one request.
#[derive(Default)]
pub struct WorkflowContext {
    notifier: Arc<CollectingNotifier>,
    events: Arc<Mutex<Vec<HostEvent>>>,
}

impl WorkflowContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifier(&self) -> Arc<dyn NotificationSink> {
        self.notifier.clone()
    }

    pub fn on_event(&self) -> EventCallback {
        let events = Arc::clone(&self.events);
        Arc::new(move |event| {
            if let Ok(mut events) = events.lock() {
                events.push(event);
            }
        })
    }

    fn last_event(&self) -> Option<&'static str> {
        self.events
            .lock()
            .ok()
            .and_then(|events| events.last().map(HostEvent::as_str))
    }

    pub fn respond<T: Serialize>(&self, data: T) -> Json<WorkflowResponse<T>> {
        Json(WorkflowResponse {
            data,
            notifications: self.notifier.take(),
            event: self.last_event(),
        })
    }

    pub fn fail(&self, err: WorkflowError) -> ApiError {
        let status = status_for(&err);
        let fields = match &err {
            WorkflowError::InvalidForm(fields) => Some(fields.clone()),
            _ => None,
        };
        (
            status,
            Json(ErrorResponse {
                error: err.to_string(),
                fields,
                notifications: self.notifier.take(),
            }),
        )
    }
}

/// HTTP status for a workflow failure.
pub fn status_for(err: &WorkflowError) -> StatusCode {
    match err {
        WorkflowError::InvalidForm(_) | WorkflowError::InvalidSigners(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        WorkflowError::RemoteCall {
            status: Some(404), ..
        } => StatusCode::NOT_FOUND,
        WorkflowError::RemoteCall { .. }
        | WorkflowError::FatalSubmission { .. }
        | WorkflowError::PartialSubmission { .. } => StatusCode::BAD_GATEWAY,
        WorkflowError::NotLinked { .. } => StatusCode::NOT_FOUND,
        WorkflowError::SignersLocked { .. } => StatusCode::CONFLICT,
        WorkflowError::Link(LinkError::AlreadyLinked { .. }) => StatusCode::CONFLICT,
        WorkflowError::Link(LinkError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
