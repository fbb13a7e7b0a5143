//! Per image metrics for downloads, resizes and uploads.

use crate::domain::ImageKind;
use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct ImageMetrics;

impl ImageMetrics {
    pub fn record_download(kind: ImageKind, bytes: usize) {
        ::metrics::counter!(phase_metric!(counter, "images", "downloaded"), "kind" => kind.as_str()).increment(1);
        ::metrics::histogram!(phase_metric!(histogram, "images", "payload_bytes")).record(bytes as f64);
    }

    pub fn record_resize(kind: ImageKind) {
        ::metrics::counter!(phase_metric!(counter, "images", "resized"), "kind" => kind.as_str()).increment(1);
    }

    pub fn record_upload(kind: ImageKind) {
        ::metrics::counter!(phase_metric!(counter, "images", "uploaded"), "kind" => kind.as_str()).increment(1);
    }
}

impl PhaseMetrics for ImageMetrics {
    fn register_metrics() {
        use ::metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "images", "downloaded"));
        let _ = counter!(phase_metric!(counter, "images", "resized"));
        let _ = counter!(phase_metric!(counter, "images", "uploaded"));
        let _ = histogram!(phase_metric!(histogram, "images", "payload_bytes"));
    }

    fn phase_name() -> &'static str {
        "images"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "images", "downloaded"),
                metric_type: MetricType::Counter,
                help: "Branding images downloaded from a source",
                labels: vec!["kind"],
            },
            MetricDoc {
                name: phase_metric!(counter, "images", "resized"),
                metric_type: MetricType::Counter,
                help: "Logos letterboxed into their canvas",
                labels: vec!["kind"],
            },
            MetricDoc {
                name: phase_metric!(counter, "images", "uploaded"),
                metric_type: MetricType::Counter,
                help: "Branding images uploaded to a target",
                labels: vec!["kind"],
            },
            MetricDoc {
                name: phase_metric!(histogram, "images", "payload_bytes"),
                metric_type: MetricType::Histogram,
                help: "Size of downloaded images in bytes",
                labels: vec![],
            },
        ]
    }
}
