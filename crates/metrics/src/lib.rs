pub mod error;
mod server;
mod traits;

use snafu::ResultExt;

pub use self::{error::Error, server::start_metrics_server, traits::Metrics};

/// Registry-backed [`Metrics`] shared by every component that records
/// counters.
#[derive(Clone, Debug)]
pub struct DefaultMetrics {
    registry: prometheus::Registry,
}

impl DefaultMetrics {
    /// # Errors
    ///
    /// Returns an error if the registry namespace is rejected by `prometheus`.
    pub fn new() -> Result<Self, Error> {
        let registry = prometheus::Registry::new_custom(Some("ipscope".to_string()), None)
            .context(error::RegisterSnafu)?;

        Ok(Self { registry })
    }

    /// Registry to attach collectors to.
    #[must_use]
    pub const fn registry(&self) -> &prometheus::Registry { &self.registry }
}

impl Metrics for DefaultMetrics {
    fn gather(&self) -> Vec<prometheus::proto::MetricFamily> { self.registry.gather() }
}

#[cfg(test)]
mod tests {
    use prometheus::{IntCounter, Opts};

    use crate::{DefaultMetrics, Metrics};

    #[test]
    fn test_new() { drop(DefaultMetrics::new().unwrap()); }

    #[test]
    fn test_gather_uses_namespace() {
        let metrics = DefaultMetrics::new().unwrap();
        let counter = IntCounter::with_opts(Opts::new("requests_total", "test counter")).unwrap();
        metrics.registry().register(Box::new(counter.clone())).unwrap();
        counter.inc();

        let families = metrics.gather();
        assert_eq!(families.len(), 1);
        assert_eq!(families[0].get_name(), "ipscope_requests_total");
    }

    #[test]
    fn test_encode_text() {
        let metrics = DefaultMetrics::new().unwrap();
        let counter = IntCounter::with_opts(Opts::new("hits_total", "test counter")).unwrap();
        metrics.registry().register(Box::new(counter.clone())).unwrap();
        counter.inc_by(3);

        let text = String::from_utf8(crate::server::encode(&metrics).unwrap().to_vec()).unwrap();
        assert!(text.contains("ipscope_hits_total 3"));
    }
}
