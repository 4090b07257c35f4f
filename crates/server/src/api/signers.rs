//! Signer management for a ticket's document.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use signdesk_core::{signing::RemoteSigner, SignerForm, SignerRow, TicketId};
use std::sync::Arc;

use super::{ApiError, WorkflowContext, WorkflowResponse};
use crate::state::AppState;

/// Query parameters for removing a signer
#[derive(Debug, Deserialize)]
pub struct RemoveSignerParams {
    pub email: String,
}

/// Response for a signer addition
#[derive(Debug, Serialize)]
pub struct AddSignerResponse {
    pub signer: RemoteSigner,
    pub signers: Vec<SignerRow>,
}

pub async fn list_signers(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<TicketId>,
) -> Result<Json<WorkflowResponse<Vec<SignerRow>>>, ApiError> {
    let ctx = WorkflowContext::new();
    let tracker = state.document_tracker(ctx.notifier(), ctx.on_event());

    match tracker.signers(ticket_id).await {
        Ok(workflow) => Ok(ctx.respond(workflow.rows())),
        Err(e) => Err(ctx.fail(e)),
    }
}

pub async fn add_signer(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<TicketId>,
    Json(form): Json<SignerForm>,
) -> Result<(StatusCode, Json<WorkflowResponse<AddSignerResponse>>), ApiError> {
    let ctx = WorkflowContext::new();
    let tracker = state.document_tracker(ctx.notifier(), ctx.on_event());

    let mut workflow = tracker.signers(ticket_id).await.map_err(|e| ctx.fail(e))?;
    match workflow.add_signer(form).await {
        Ok(signer) => Ok((
            StatusCode::CREATED,
            ctx.respond(AddSignerResponse {
                signer,
                signers: workflow.rows(),
            }),
        )),
        Err(e) => Err(ctx.fail(e)),
    }
}

pub async fn remove_signer(
    State(state): State<Arc<AppState>>,
    Path((ticket_id, signer_key)): Path<(TicketId, String)>,
    Query(params): Query<RemoveSignerParams>,
) -> Result<Json<WorkflowResponse<Vec<SignerRow>>>, ApiError> {
    let ctx = WorkflowContext::new();
    let tracker = state.document_tracker(ctx.notifier(), ctx.on_event());

    let mut workflow = tracker.signers(ticket_id).await.map_err(|e| ctx.fail(e))?;
    match workflow.remove_signer(&signer_key, &params.email).await {
        Ok(()) => Ok(ctx.respond(workflow.rows())),
        Err(e) => Err(ctx.fail(e)),
    }
}
