use std::collections::HashMap;

use tracing::{debug, warn};

use crate::metrics::{ImageMetrics, MetricDoc, PhaseMetrics, TransferMetrics};

/// Registers the metrics of every phase and warns about name clashes.
/// Returns the number of distinct metrics.
pub fn register_all_metrics() -> usize {
    let mut all_metrics = HashMap::new();

    register_phase_metrics::<TransferMetrics>(&mut all_metrics);
    register_phase_metrics::<ImageMetrics>(&mut all_metrics);

    debug!("Registered {} metrics", all_metrics.len());
    all_metrics.len()
}

fn register_phase_metrics<T: PhaseMetrics>(all_metrics: &mut HashMap<&'static str, MetricDoc>) {
    T::register_metrics();
    for doc in T::metrics_documentation() {
        if all_metrics.contains_key(doc.name) {
            warn!("Metric '{}' of phase '{}' is already registered", doc.name, T::phase_name());
        } else {
            all_metrics.insert(doc.name, doc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_are_unique() {
        let expected = TransferMetrics::metrics_documentation().len() + ImageMetrics::metrics_documentation().len();
        assert_eq!(register_all_metrics(), expected);
    }
}
