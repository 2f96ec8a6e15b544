//! Export the metrics gathered with Prometheus.

use prometheus::{Encoder, TextEncoder};

/// Encode all registered metrics in the Prometheus text format.
///
/// The result can be served as is by any HTTP endpoint scraped by Prometheus.
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();

    let metric_families = prometheus::gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer)?;

    String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
}
