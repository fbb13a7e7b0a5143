//! Run level metrics: workflow outcomes and stage timings.

use crate::app::ports::Stage;
use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct TransferMetrics;

impl TransferMetrics {
    pub fn record_run(workflow: &'static str, success: bool, duration_secs: f64) {
        let outcome = if success { "success" } else { "failure" };
        ::metrics::counter!(phase_metric!(counter, "transfer", "runs"), "workflow" => workflow, "outcome" => outcome)
            .increment(1);
        ::metrics::histogram!(phase_metric!(histogram, "transfer", "run_duration_seconds"), "workflow" => workflow)
            .record(duration_secs);
    }

    pub fn record_stage(stage: Stage, duration_secs: f64) {
        ::metrics::histogram!(phase_metric!(histogram, "transfer", "stage_duration_seconds"), "stage" => stage.as_str())
            .record(duration_secs);
    }

    pub fn record_stage_error(stage: Stage, label: &'static str) {
        ::metrics::counter!(phase_metric!(counter, "transfer", "stage_errors"), "stage" => stage.as_str(), "error" => label)
            .increment(1);
    }
}

impl PhaseMetrics for TransferMetrics {
    fn register_metrics() {
        use ::metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "transfer", "runs"));
        let _ = counter!(phase_metric!(counter, "transfer", "stage_errors"));
        let _ = histogram!(phase_metric!(histogram, "transfer", "run_duration_seconds"));
        let _ = histogram!(phase_metric!(histogram, "transfer", "stage_duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "transfer"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "transfer", "runs"),
                metric_type: MetricType::Counter,
                help: "Completed spray, save and load runs",
                labels: vec!["workflow", "outcome"],
            },
            MetricDoc {
                name: phase_metric!(counter, "transfer", "stage_errors"),
                metric_type: MetricType::Counter,
                help: "Stages that ended with an error",
                labels: vec!["stage", "error"],
            },
            MetricDoc {
                name: phase_metric!(histogram, "transfer", "run_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Wall time of a whole run including cleanup",
                labels: vec!["workflow"],
            },
            MetricDoc {
                name: phase_metric!(histogram, "transfer", "stage_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Wall time per pipeline stage",
                labels: vec!["stage"],
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_metrics_follow_naming_convention() {
        TransferMetrics::register_metrics();
        let docs = TransferMetrics::metrics_documentation();
        assert_eq!(docs.len(), 4);
        for doc in docs {
            assert!(doc.name.starts_with("dcspray_transfer_"));
            if doc.metric_type == MetricType::Counter {
                assert!(doc.name.ends_with("_total"));
            }
        }
    }
}
