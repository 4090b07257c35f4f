//! Ticket attachment handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use signdesk_core::{Attachment, Notification, TicketId, WorkflowError};
use std::sync::Arc;
use tracing::warn;

use super::{ApiError, WorkflowContext, WorkflowResponse};
use crate::state::AppState;

/// Every attachment selectable for the ticket's document.
pub async fn list_attachments(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<TicketId>,
) -> Result<Json<WorkflowResponse<Vec<Attachment>>>, ApiError> {
    let ctx = WorkflowContext::new();
    let attachments = load_attachments(&state, &ctx, ticket_id).await?;
    Ok(ctx.respond(attachments))
}

/// Resolve attachments, notifying the agent when the helpdesk lookup fails.
pub(crate) async fn load_attachments(
    state: &AppState,
    ctx: &WorkflowContext,
    ticket_id: TicketId,
) -> Result<Vec<Attachment>, ApiError> {
    match state.attachments().list_attachments(ticket_id).await {
        Ok(attachments) => Ok(attachments),
        Err(e) => {
            warn!("Ticket {}: attachments unavailable: {}", ticket_id, e);
            ctx.notifier().notify(Notification::error(
                "Error",
                format!("Could not load the ticket's attachments: {}", e),
            ));
            Err(ctx.fail(WorkflowError::fetch("list attachments", &e)))
        }
    }
}
