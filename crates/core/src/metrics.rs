//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Document submissions (primary and secondary uploads, link persistence)
//! - Signer management
//! - External services (helpdesk, signing API)

use std::time::Instant;

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Submission Metrics
// =============================================================================

/// Document submissions by outcome.
pub static SUBMISSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("signdesk_submissions_total", "Total document submissions"),
        &["result"], // "complete", "partial", "failed", "invalid"
    )
    .unwrap()
});

/// File uploads to the signing service.
pub static UPLOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("signdesk_uploads_total", "Total file uploads"),
        &["kind", "result"], // kind: "primary", "secondary"
    )
    .unwrap()
});

/// Ticket link writes and deletions.
pub static LINK_OPERATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "signdesk_link_operations_total",
            "Ticket to document link operations",
        ),
        &["operation", "result"],
    )
    .unwrap()
});

// =============================================================================
// Signer Metrics
// =============================================================================

/// Remote signer additions and removals.
pub static SIGNER_OPERATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "signdesk_signer_operations_total",
            "Signer add/remove operations",
        ),
        &["operation", "result"],
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// External service request duration.
pub static EXTERNAL_SERVICE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "signdesk_external_service_duration_seconds",
            "Duration of external service calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["service", "operation"],
    )
    .unwrap()
});

/// External service requests total.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "signdesk_external_service_requests_total",
            "Total external service requests",
        ),
        &["service", "operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

/// Record one external call's duration and outcome.
pub fn observe_external_call(service: &str, operation: &str, started: Instant, success: bool) {
    EXTERNAL_SERVICE_DURATION
        .with_label_values(&[service, operation])
        .observe(started.elapsed().as_secs_f64());
    EXTERNAL_SERVICE_REQUESTS
        .with_label_values(&[service, operation, if success { "success" } else { "error" }])
        .inc();
}

/// Label for a success/failure outcome.
pub fn result_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SUBMISSIONS_TOTAL.clone()),
        Box::new(UPLOADS_TOTAL.clone()),
        Box::new(LINK_OPERATIONS.clone()),
        Box::new(SIGNER_OPERATIONS.clone()),
        Box::new(EXTERNAL_SERVICE_DURATION.clone()),
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
    ]
}
