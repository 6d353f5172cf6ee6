//! CRUD metrics.
//!
//! Recorded through the `metrics` facade. Installing a recorder (Prometheus,
//! StatsD, ...) is left to the embedding service; without one every call is a
//! no-op.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `solon_crud_operations_total` | Counter | `operation`, `status` | Completed executes |
//! | `solon_crud_operation_duration_seconds` | Histogram | `operation` | Execute latency |
//! | `solon_crud_bind_failures_total` | Counter | `operation`, `source` | Rejected binds |

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Name of the operations counter.
pub const OPERATIONS_TOTAL: &str = "solon_crud_operations_total";

/// Name of the operation duration histogram.
pub const OPERATION_DURATION_SECONDS: &str = "solon_crud_operation_duration_seconds";

/// Name of the bind failure counter.
pub const BIND_FAILURES_TOTAL: &str = "solon_crud_bind_failures_total";

/// Registers descriptions for the CRUD metrics with the installed recorder.
pub fn describe_metrics() {
    describe_counter!(OPERATIONS_TOTAL, "Total number of CRUD operations executed");
    describe_histogram!(
        OPERATION_DURATION_SECONDS,
        "CRUD operation execute duration in seconds"
    );
    describe_counter!(
        BIND_FAILURES_TOTAL,
        "Total number of requests rejected during binding"
    );
}

/// Records a completed execute phase.
///
/// # Arguments
///
/// * `operation` - The CRUD shape (e.g., "insert")
/// * `status_code` - HTTP status of the outcome
/// * `duration` - Time spent in the execute phase
pub fn record_operation(operation: &'static str, status_code: u16, duration: Duration) {
    counter!(
        OPERATIONS_TOTAL,
        "operation" => operation,
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(OPERATION_DURATION_SECONDS, "operation" => operation)
        .record(duration.as_secs_f64());
}

/// Records a rejected bind phase.
///
/// # Arguments
///
/// * `operation` - The CRUD shape
/// * `source` - Which input failed (`identity`, `path`, `body`, `query`)
pub fn record_bind_failure(operation: &'static str, source: &'static str) {
    counter!(
        BIND_FAILURES_TOTAL,
        "operation" => operation,
        "source" => source
    )
    .increment(1);
}
