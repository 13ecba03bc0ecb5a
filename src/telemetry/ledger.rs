//! Ledger operation span helpers.
//!
//! Provides span creation and status-transition recording for operations
//! flowing through the ledger.

use tracing::Span;

use crate::model::ClockStatus;

/// Start a span for a ledger operation on one worker.
///
/// The `ledger.status` field is declared empty and can be filled via
/// [`record_status_transition`].
pub fn start_operation_span(operation: &'static str, worker_id: &str) -> Span {
    tracing::info_span!(
        "ledger.operation",
        "ledger.operation" = operation,
        "ledger.worker_id" = worker_id,
        "ledger.status" = tracing::field::Empty,
    )
}

/// Record a clock status transition on the given span.
///
/// Emits a tracing `info` event scoped to the span.
pub fn record_status_transition(span: &Span, from: ClockStatus, to: ClockStatus) {
    span.record("ledger.status", tracing::field::display(to));
    span.in_scope(|| {
        tracing::info!(from = %from, to = %to, "status_transition");
    });
}
