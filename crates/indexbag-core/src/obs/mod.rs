//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Counters are thread-local; the container model is single-threaded.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, IndexCounters};
pub use sink::{
    ExecKind, ExecOutcome, MetricsEvent, MetricsSink, metrics_report, metrics_reset_all,
    with_metrics_sink,
};
