//! Logging infrastructure for rollup observability.
//!
//! All events use `tracing` with target "shard_rollup" and include an `event`
//! field for filtering.
//!
//! ## Library Integration
//!
//! The crate never initializes a global subscriber. Applications configure
//! tracing via `tracing_subscriber` or similar.
//!
//! ## Conventions
//!
//! - `event`: snake_case event name (required)
//! - `component`: module/subsystem (e.g., "field_index_rollup", "range")
//! - Use `%` for Display, `?` for Debug formatting
//! - Per-posting events stay at trace level; the scan path runs once per candidate value

/// Target for all rollup log events.
pub(crate) const ROLLUP_TARGET: &str = "shard_rollup";

/// Macro for debug-level log events.
///
/// # Example
/// ```ignore
/// log_debug!(
///     component = "field_index_rollup",
///     event = "rollup_seek_ahead",
///     next_count,
///     max_next_count,
/// );
/// ```
macro_rules! log_debug {
    ($($field:tt)*) => {
        ::tracing::debug!(target: $crate::observability::ROLLUP_TARGET, $($field)*)
    };
}

/// Macro for trace-level log events.
macro_rules! log_trace {
    ($($field:tt)*) => {
        ::tracing::trace!(target: $crate::observability::ROLLUP_TARGET, $($field)*)
    };
}

/// Macro for warn-level log events.
macro_rules! log_warn {
    ($($field:tt)*) => {
        ::tracing::warn!(target: $crate::observability::ROLLUP_TARGET, $($field)*)
    };
}

pub(crate) use log_debug;
pub(crate) use log_trace;
pub(crate) use log_warn;
