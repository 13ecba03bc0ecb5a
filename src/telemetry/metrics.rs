//! Metric instrument factories for workforce-ledger.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! Without a configured provider every instrument is a no-op.

use opentelemetry::metrics::{Counter, Histogram, Meter};

/// Returns the shared meter for workforce-ledger instruments.
fn meter() -> Meter {
    opentelemetry::global::meter("workforce-ledger")
}

/// Counter: workers registered.
pub fn workers_registered() -> Counter<u64> {
    meter()
        .u64_counter("workforce.workers.registered")
        .with_description("Number of workers registered")
        .build()
}

/// Counter: workers deleted (with their sessions).
pub fn workers_deleted() -> Counter<u64> {
    meter()
        .u64_counter("workforce.workers.deleted")
        .with_description("Number of workers deleted")
        .build()
}

/// Counter: accepted clock transitions.
/// Labels: `direction` ("in" | "out").
pub fn clock_events() -> Counter<u64> {
    meter()
        .u64_counter("workforce.clock.events")
        .with_description("Number of accepted clock-in and clock-out operations")
        .build()
}

/// Counter: rejected clock transitions.
/// Labels: `reason` (an `Error::kind()` label).
pub fn clock_rejected() -> Counter<u64> {
    meter()
        .u64_counter("workforce.clock.rejected")
        .with_description("Number of rejected clock-in and clock-out operations")
        .build()
}

/// Histogram: closed session length in minutes.
pub fn session_minutes() -> Histogram<f64> {
    meter()
        .f64_histogram("workforce.session.minutes")
        .with_description("Length of closed sessions")
        .with_unit("min")
        .build()
}
