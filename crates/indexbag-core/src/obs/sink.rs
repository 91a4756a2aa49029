//! Metrics sink boundary.
//!
//! Container and index logic MUST NOT touch obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between mutation logic
//! and the global metrics state.
use crate::{identity::IndexLabel, obs::metrics};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecKind {
    Add,
    Delete,
    Attach,
    Clear,
}

///
/// ExecOutcome
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecOutcome {
    Applied,
    Rejected,
    NotFound,

    /// The span was dropped without finishing (a key function panicked).
    Aborted,
}

///
/// MetricsEvent
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    ExecStart {
        kind: ExecKind,
    },
    ExecFinish {
        kind: ExecKind,
        outcome: ExecOutcome,
    },
    UniqueViolation {
        index: IndexLabel,
    },
    IndexDelta {
        inserts: u64,
        removes: u64,
    },
    Backfill {
        index: IndexLabel,
        values: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default thread-local sink that writes into global metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::ExecStart { kind } => {
                metrics::with_state_mut(|m| match kind {
                    ExecKind::Add => m.ops.add_calls = m.ops.add_calls.saturating_add(1),
                    ExecKind::Delete => m.ops.delete_calls = m.ops.delete_calls.saturating_add(1),
                    ExecKind::Attach => m.ops.attach_calls = m.ops.attach_calls.saturating_add(1),
                    ExecKind::Clear => m.ops.clear_calls = m.ops.clear_calls.saturating_add(1),
                });
            }
            MetricsEvent::ExecFinish { outcome, .. } => {
                metrics::with_state_mut(|m| match outcome {
                    ExecOutcome::Applied => m.ops.applied = m.ops.applied.saturating_add(1),
                    ExecOutcome::Rejected => m.ops.rejected = m.ops.rejected.saturating_add(1),
                    ExecOutcome::NotFound => m.ops.not_found = m.ops.not_found.saturating_add(1),
                    ExecOutcome::Aborted => m.ops.aborted = m.ops.aborted.saturating_add(1),
                });
            }
            MetricsEvent::UniqueViolation { index } => {
                metrics::with_state_mut(|m| {
                    m.ops.unique_violations = m.ops.unique_violations.saturating_add(1);

                    let entry = m.indexes.entry(index.to_string()).or_default();
                    entry.unique_violations = entry.unique_violations.saturating_add(1);
                });
            }
            MetricsEvent::IndexDelta { inserts, removes } => {
                metrics::with_state_mut(|m| {
                    m.ops.index_inserts = m.ops.index_inserts.saturating_add(inserts);
                    m.ops.index_removes = m.ops.index_removes.saturating_add(removes);
                });
            }
            MetricsEvent::Backfill { index, values } => {
                metrics::with_state_mut(|m| {
                    m.ops.backfilled_values = m.ops.backfilled_values.saturating_add(values);

                    let entry = m.indexes.entry(index.to_string()).or_default();
                    entry.backfilled_values = entry.backfilled_values.saturating_add(values);
                });
            }
        }
    }
}

#[cfg_attr(not(feature = "metrics"), expect(dead_code))]
pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

#[cfg(feature = "metrics")]
pub(crate) fn record(event: MetricsEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

#[cfg(not(feature = "metrics"))]
pub(crate) fn record(_event: MetricsEvent) {}

/// Snapshot the current metrics state for the calling thread.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state for the calling thread.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
///
/// The previous sink is restored on every exit path, including unwind.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// Span
/// RAII guard that emits start/finish events for one container operation.
/// Dropping an unfinished span records `Aborted`.
///

pub(crate) struct Span {
    kind: ExecKind,
    finished: bool,
}

impl Span {
    #[must_use]
    pub(crate) fn new(kind: ExecKind) -> Self {
        record(MetricsEvent::ExecStart { kind });

        Self {
            kind,
            finished: false,
        }
    }

    pub(crate) fn finish(mut self, outcome: ExecOutcome) {
        self.finished = true;
        record(MetricsEvent::ExecFinish {
            kind: self.kind,
            outcome,
        });
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        if !self.finished {
            self.finished = true;
            record(MetricsEvent::ExecFinish {
                kind: self.kind,
                outcome: ExecOutcome::Aborted,
            });
        }
    }
}
