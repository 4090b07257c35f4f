//! Handlers for the document linked to a ticket.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use signdesk_core::{
    DocumentForm, RemoteDocument, SignerForm, SubmissionReport, SubmissionRequest, TicketId,
    TrackedDocument,
};
use std::sync::Arc;

use super::attachments::load_attachments;
use super::{ApiError, WorkflowContext, WorkflowResponse};
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

/// Request body for submitting a document
#[derive(Debug, Deserialize)]
pub struct SubmitDocumentBody {
    pub document: DocumentForm,
    /// Drafted signers registered right after the uploads
    #[serde(default)]
    pub signers: Option<Vec<SignerForm>>,
}

/// Request body for linking an existing remote document
#[derive(Debug, Deserialize)]
pub struct LinkDocumentBody {
    pub document_uuid: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Current document of the ticket; `data` is null when there is none.
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<TicketId>,
) -> Result<Json<WorkflowResponse<Option<TrackedDocument>>>, ApiError> {
    let ctx = WorkflowContext::new();
    let tracker = state.document_tracker(ctx.notifier(), ctx.on_event());

    match tracker.load(ticket_id).await {
        Ok(document) => Ok(ctx.respond(document)),
        Err(e) => Err(ctx.fail(e)),
    }
}

/// Create a remote document from the ticket's attachments.
pub async fn submit_document(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<TicketId>,
    Json(body): Json<SubmitDocumentBody>,
) -> Result<(StatusCode, Json<WorkflowResponse<SubmissionReport>>), ApiError> {
    let ctx = WorkflowContext::new();
    let attachments = load_attachments(&state, &ctx, ticket_id).await?;

    let workflow = state.submission_workflow(ctx.notifier(), ctx.on_event());
    let request = SubmissionRequest {
        ticket_id,
        attachments,
        form: body.document,
        signers: body.signers,
    };

    match workflow.submit(request).await {
        Ok(report) => Ok((StatusCode::CREATED, ctx.respond(report))),
        Err(e) => Err(ctx.fail(e)),
    }
}

/// Cancel the ticket's document.
pub async fn cancel_document(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<TicketId>,
) -> Result<Json<WorkflowResponse<RemoteDocument>>, ApiError> {
    let ctx = WorkflowContext::new();
    let tracker = state.document_tracker(ctx.notifier(), ctx.on_event());

    match tracker.cancel(ticket_id).await {
        Ok(document) => Ok(ctx.respond(document)),
        Err(e) => Err(ctx.fail(e)),
    }
}

/// Link a document that already exists on the signing service.
pub async fn link_document(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<TicketId>,
    Json(body): Json<LinkDocumentBody>,
) -> Result<(StatusCode, Json<WorkflowResponse<TrackedDocument>>), ApiError> {
    let ctx = WorkflowContext::new();
    let tracker = state.document_tracker(ctx.notifier(), ctx.on_event());

    match tracker.link_existing(ticket_id, body.document_uuid.trim()).await {
        Ok(tracked) => Ok((StatusCode::CREATED, ctx.respond(tracked))),
        Err(e) => Err(ctx.fail(e)),
    }
}

/// Release the ticket's document to its signers.
pub async fn send_document(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<TicketId>,
) -> Result<Json<WorkflowResponse<RemoteDocument>>, ApiError> {
    let ctx = WorkflowContext::new();
    let tracker = state.document_tracker(ctx.notifier(), ctx.on_event());

    match tracker.send_to_signers(ticket_id).await {
        Ok(document) => Ok(ctx.respond(document)),
        Err(e) => Err(ctx.fail(e)),
    }
}
