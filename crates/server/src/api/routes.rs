use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::middleware::{auth_middleware, metrics_middleware};
use super::{attachments, documents, forms, handlers, signers};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Routes called by the helpdesk app; all require authentication
    let app_routes = Router::new()
        .route("/config", get(handlers::get_config))
        // Forms
        .route("/forms/document", get(forms::document_form))
        .route("/forms/signer", get(forms::signer_form))
        .route("/forms/signer/draft", get(forms::signer_draft))
        .route("/forms/signer/draft/rows", post(forms::add_draft_row))
        .route("/forms/signer/draft/remove", post(forms::remove_draft_row))
        .route("/forms/signer/draft/validate", post(forms::validate_draft))
        // Tickets
        .route("/tickets/{id}/attachments", get(attachments::list_attachments))
        .route(
            "/tickets/{id}/document",
            get(documents::get_document)
                .post(documents::submit_document)
                .delete(documents::cancel_document),
        )
        .route("/tickets/{id}/document/link", post(documents::link_document))
        .route("/tickets/{id}/document/send", post(documents::send_document))
        // Signers
        .route(
            "/tickets/{id}/document/signers",
            get(signers::list_signers).post(signers::add_signer),
        )
        .route(
            "/tickets/{id}/document/signers/{key}",
            delete(signers::remove_signer),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .merge(app_routes)
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
