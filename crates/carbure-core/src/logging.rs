//! Logging facilities for Carbure.
//!
//! Carbure uses the `tracing` crate for instrumentation. The crates never
//! install a subscriber themselves; applications do:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("carbure_select::async_list=debug")
//!         .init();
//! }
//! ```
//!
//! Every subsystem logs under one of the [`targets`], so filtering on a
//! target isolates a single layer (for example, only the option cache).

/// Span names used throughout Carbure for tracing.
pub mod span_names {
    /// Option fetch span (browsable set).
    pub const FETCH: &str = "carbure::fetch";
    /// Selected-value resolution span.
    pub const RESOLVE: &str = "carbure::resolve";
    /// Invalidation bus dispatch span.
    pub const INVALIDATE: &str = "carbure::invalidate";
}

/// Target names for log filtering.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "carbure_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "carbure_core::signal";
    /// Invalidation bus target.
    pub const BUS: &str = "carbure_core::bus";
    /// Controlled/uncontrolled state target.
    pub const STATE: &str = "carbure_core::state";
    /// Async runtime target.
    pub const RUNTIME: &str = "carbure_core::async_runtime";
    /// Matcher and normalization target.
    pub const MODEL: &str = "carbure_select::model";
    /// Async option cache target.
    pub const ASYNC_LIST: &str = "carbure_select::async_list";
    /// Headless widgets target.
    pub const WIDGET: &str = "carbure_select::widget";
    /// Preferences storage target.
    pub const PREFERENCES: &str = "carbure_select::preferences";
    /// REST client target.
    pub const NET: &str = "carbure_net";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Used to time fetches and resolutions.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span for `operation`.
    pub fn new(operation: &'static str) -> Self {
        let span = tracing::info_span!(target: "carbure::perf", "perf", operation);
        Self {
            span: span.entered(),
        }
    }
}

/// Trace-level event under the core target.
#[macro_export]
macro_rules! carbure_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "carbure_core", $($arg)*)
    };
}

/// Debug-level event under the core target.
#[macro_export]
macro_rules! carbure_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "carbure_core", $($arg)*)
    };
}

/// Warn-level event under the core target.
#[macro_export]
macro_rules! carbure_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "carbure_core", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span() {
        // Just ensure it compiles and doesn't panic without a subscriber
        let _span = PerfSpan::new("resolve_selection");
    }

    #[test]
    fn test_targets_are_namespaced() {
        for target in [targets::SIGNAL, targets::BUS, targets::STATE, targets::RUNTIME] {
            assert!(target.starts_with(targets::CORE));
        }
    }
}
