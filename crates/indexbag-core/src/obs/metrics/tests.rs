use crate::{
    identity::{IndexLabel, IndexName},
    obs::{
        metrics::{report, reset_all},
        sink::{ExecKind, ExecOutcome, GLOBAL_METRICS_SINK, MetricsEvent, MetricsSink},
    },
};

fn by_n() -> IndexLabel {
    IndexLabel::Named(IndexName::try_from_str("by_n").unwrap())
}

#[test]
fn global_sink_counts_calls_and_outcomes() {
    reset_all();

    GLOBAL_METRICS_SINK.record(MetricsEvent::ExecStart {
        kind: ExecKind::Add,
    });
    GLOBAL_METRICS_SINK.record(MetricsEvent::ExecFinish {
        kind: ExecKind::Add,
        outcome: ExecOutcome::Rejected,
    });
    GLOBAL_METRICS_SINK.record(MetricsEvent::ExecStart {
        kind: ExecKind::Delete,
    });
    GLOBAL_METRICS_SINK.record(MetricsEvent::ExecFinish {
        kind: ExecKind::Delete,
        outcome: ExecOutcome::NotFound,
    });

    let ops = report().ops;
    assert_eq!(ops.add_calls, 1);
    assert_eq!(ops.delete_calls, 1);
    assert_eq!(ops.rejected, 1);
    assert_eq!(ops.not_found, 1);
    assert_eq!(ops.applied, 0);
}

#[test]
fn violations_and_backfill_are_tracked_per_index() {
    reset_all();

    GLOBAL_METRICS_SINK.record(MetricsEvent::UniqueViolation { index: by_n() });
    GLOBAL_METRICS_SINK.record(MetricsEvent::UniqueViolation {
        index: IndexLabel::Unnamed,
    });
    GLOBAL_METRICS_SINK.record(MetricsEvent::Backfill {
        index: by_n(),
        values: 3,
    });

    let report = report();
    assert_eq!(report.ops.unique_violations, 2);
    assert_eq!(report.ops.backfilled_values, 3);
    assert_eq!(report.indexes["by_n"].unique_violations, 1);
    assert_eq!(report.indexes["by_n"].backfilled_values, 3);
    assert_eq!(report.indexes["<unnamed>"].unique_violations, 1);
}

#[test]
fn index_delta_accumulates() {
    reset_all();

    GLOBAL_METRICS_SINK.record(MetricsEvent::IndexDelta {
        inserts: 2,
        removes: 0,
    });
    GLOBAL_METRICS_SINK.record(MetricsEvent::IndexDelta {
        inserts: 1,
        removes: 4,
    });

    let ops = report().ops;
    assert_eq!(ops.index_inserts, 3);
    assert_eq!(ops.index_removes, 4);

    reset_all();
    assert_eq!(report().ops, super::EventOps::default());
}

#[test]
fn report_serializes_to_json() {
    reset_all();
    GLOBAL_METRICS_SINK.record(MetricsEvent::UniqueViolation { index: by_n() });

    let json = serde_json::to_value(report()).unwrap();
    assert_eq!(json["ops"]["unique_violations"], 1);
    assert_eq!(json["indexes"]["by_n"]["unique_violations"], 1);
}
