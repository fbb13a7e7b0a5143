//! Metrics for transfer runs.
//!
//! Each area of the pipeline owns a metrics struct in its own submodule. No exporter
//! is installed here, so recording is a no-op unless the embedding process sets a
//! recorder.

pub mod images;
pub mod registry;
pub mod transfer;

pub use images::ImageMetrics;
pub use transfer::TransferMetrics;

/// Implemented by every metrics collection.
pub trait PhaseMetrics {
    /// Touch every metric once so it shows up before first use.
    fn register_metrics();

    fn phase_name() -> &'static str;

    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
    pub labels: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
}

/// Builds metric names as `dcspray_{phase}_{name}`, counters get a `_total` suffix.
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("dcspray_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("dcspray_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;
