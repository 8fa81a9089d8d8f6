//! Store metrics.
//!
//! Metrics go through the `metrics` facade. Nothing is exported by this crate;
//! a host process that wants them installs its own recorder before building a
//! [`Store`](crate::Store). Without a recorder every call is a no-op.

use metrics::{Unit, describe_counter, describe_histogram};

// Re-export metrics macros for use in other modules
pub use metrics::{counter, histogram};

/// Actions applied by committed sends (including follow-ups)
pub const ACTIONS_APPLIED: &str = "console_store_actions_applied_total";

/// Sends rejected by the reducer or the dispatch limit
pub const ACTIONS_REJECTED: &str = "console_store_actions_rejected_total";

/// Wall time spent inside a single reducer call
pub const REDUCER_DURATION: &str = "console_store_reducer_duration_seconds";

/// Registers descriptions for all store metrics.
///
/// Safe to call more than once; descriptions are idempotent.
pub fn register_metrics() {
    describe_counter!(
        ACTIONS_APPLIED,
        Unit::Count,
        "Actions applied by committed store sends"
    );
    describe_counter!(
        ACTIONS_REJECTED,
        Unit::Count,
        "Store sends rolled back because an action was rejected"
    );
    describe_histogram!(
        REDUCER_DURATION,
        Unit::Seconds,
        "Time spent in a single reducer invocation"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_are_prometheus_friendly() {
        for name in [ACTIONS_APPLIED, ACTIONS_REJECTED, REDUCER_DURATION] {
            assert!(name.starts_with("console_store_"));
            assert!(name.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }

    #[test]
    fn register_without_recorder_is_noop() {
        register_metrics();
        register_metrics();
    }
}
