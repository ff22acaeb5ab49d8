//! Prometheus metrics for the queue core.
//!
//! Collectors are process-wide statics; embedders register them with
//! [`all_metrics`] in whatever registry they expose.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Issuance
// =============================================================================

/// Tickets issued total.
pub static TICKETS_ISSUED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("waitroom_tickets_issued_total", "Total tickets issued").unwrap()
});

/// Positions handed out by the allocator.
pub static ALLOCATED_POSITION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "waitroom_allocated_position",
            "Queue position assigned on issue or move back",
        )
        .buckets(vec![1.0, 2.0, 3.0, 5.0, 10.0, 20.0, 50.0, 100.0]),
        &["reason"], // "issue", "move_back"
    )
    .unwrap()
});

// =============================================================================
// Dispatch
// =============================================================================

/// Counter calls by result.
pub static DISPATCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("waitroom_dispatches_total", "Total counter calls"),
        &["result"], // "served", "idle", "rejected"
    )
    .unwrap()
});

// =============================================================================
// Mutations
// =============================================================================

/// Tickets removed by state at removal time.
pub static CANCELLATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("waitroom_cancellations_total", "Total tickets removed"),
        &["state", "by"], // state: "waiting", "in_service"; by: "customer", "staff"
    )
    .unwrap()
});

/// Tickets moved back into the queue.
pub static MOVED_BACK: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "waitroom_moved_back_total",
        "Total tickets moved back into the queue",
    )
    .unwrap()
});

/// Tickets moved forward out of the queue.
pub static MOVED_FORWARD: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "waitroom_moved_forward_total",
        "Total tickets moved forward out of the queue",
    )
    .unwrap()
});

/// Operations rejected with an error, by operation.
pub static OPERATION_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("waitroom_operation_errors_total", "Total failed queue operations"),
        &["operation", "kind"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(TICKETS_ISSUED.clone()),
        Box::new(ALLOCATED_POSITION.clone()),
        Box::new(DISPATCHES.clone()),
        Box::new(CANCELLATIONS.clone()),
        Box::new(MOVED_BACK.clone()),
        Box::new(MOVED_FORWARD.clone()),
        Box::new(OPERATION_ERRORS.clone()),
    ]
}
