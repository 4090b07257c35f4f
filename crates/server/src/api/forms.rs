//! Form schema handlers, so the UI can render the document and signer forms.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use signdesk_core::{
    signer::signer_form_schema, submission::document_form_schema, FormSchema, SignerDraftTable,
    SignerForm, TicketId, WorkflowError,
};
use std::sync::Arc;

use super::attachments::load_attachments;
use super::middleware::Agent;
use super::{ApiError, ErrorResponse, WorkflowContext};
use crate::state::AppState;

/// Query parameters for the document form
#[derive(Debug, Deserialize)]
pub struct DocumentFormParams {
    /// Fill attachment choices from this ticket
    pub ticket_id: Option<TicketId>,
}

pub async fn document_form(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DocumentFormParams>,
) -> Result<Json<FormSchema>, ApiError> {
    let attachments = match params.ticket_id {
        Some(ticket_id) => {
            let ctx = WorkflowContext::new();
            load_attachments(&state, &ctx, ticket_id).await?
        }
        None => Vec::new(),
    };
    Ok(Json(document_form_schema(&attachments)))
}

pub async fn signer_form() -> Json<FormSchema> {
    Json(signer_form_schema())
}

/// Signer table for a new document, seeded with the calling agent.
pub async fn signer_draft(Agent(agent): Agent) -> Json<SignerDraftTable> {
    Json(SignerDraftTable::for_agent(&agent))
}

/// Request body for adding a drafted signer
#[derive(Debug, Deserialize)]
pub struct AddDraftRowBody {
    #[serde(default)]
    pub table: SignerDraftTable,
    pub signer: SignerForm,
}

/// Request body for removing a drafted signer
#[derive(Debug, Deserialize)]
pub struct RemoveDraftRowBody {
    pub table: SignerDraftTable,
    pub id: u32,
}

/// Request body for checking a draft table before submission
#[derive(Debug, Deserialize)]
pub struct ValidateDraftBody {
    pub table: SignerDraftTable,
}

#[derive(Debug, Serialize)]
pub struct DraftValidation {
    pub valid: bool,
    pub signers: usize,
}

/// Validate a signer form and append it to the draft table.
pub async fn add_draft_row(
    Json(body): Json<AddDraftRowBody>,
) -> Result<(StatusCode, Json<SignerDraftTable>), ApiError> {
    let mut table = body.table;
    if let Err(errors) = table.add(body.signer) {
        return Err(WorkflowContext::new().fail(WorkflowError::from(errors)));
    }
    Ok((StatusCode::CREATED, Json(table)))
}

/// Drop a row from the draft table by id.
pub async fn remove_draft_row(
    Json(body): Json<RemoveDraftRowBody>,
) -> Result<Json<SignerDraftTable>, ApiError> {
    let mut table = body.table;
    if !table.remove(body.id) {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("No drafted signer with id {}", body.id),
                fields: None,
                notifications: Vec::new(),
            }),
        ));
    }
    Ok(Json(table))
}

/// Check the signature order of a draft table.
pub async fn validate_draft(
    Json(body): Json<ValidateDraftBody>,
) -> Result<Json<DraftValidation>, ApiError> {
    match body.table.validate() {
        Ok(()) => Ok(Json(DraftValidation {
            valid: true,
            signers: body.table.len(),
        })),
        Err(e) => Err(WorkflowContext::new().fail(WorkflowError::from(e))),
    }
}
