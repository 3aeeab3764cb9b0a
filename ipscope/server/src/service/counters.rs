use ipscope_core::model::{GeoResult, Provider};
use prometheus::{IntCounterVec, Opts, Registry};

/// Prometheus counters of the geo resolver.
#[derive(Clone, Debug)]
pub struct GeoCounters {
    provider_requests: IntCounterVec,
    cache_lookups: IntCounterVec,
}

impl GeoCounters {
    /// Create the counters and register them with `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if a counter with the same name is already registered.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let provider_requests = IntCounterVec::new(
            Opts::new("geo_provider_requests_total", "Requests sent to geolocation providers"),
            &["provider", "outcome"],
        )?;
        let cache_lookups = IntCounterVec::new(
            Opts::new("geo_cache_lookups_total", "Geo cache lookups by result"),
            &["result"],
        )?;

        registry.register(Box::new(provider_requests.clone()))?;
        registry.register(Box::new(cache_lookups.clone()))?;

        Ok(Self { provider_requests, cache_lookups })
    }

    pub fn provider_outcome(&self, provider: Provider, result: &GeoResult) {
        let outcome = if result.is_error() { "error" } else { "success" };
        self.provider_requests.with_label_values(&[provider.as_str(), outcome]).inc();
    }

    pub fn cache_lookup(&self, hit: bool) {
        self.cache_lookups.with_label_values(&[if hit { "hit" } else { "miss" }]).inc();
    }

    #[cfg(test)]
    pub(crate) fn provider_requests(&self, provider: Provider, outcome: &str) -> u64 {
        self.provider_requests.with_label_values(&[provider.as_str(), outcome]).get()
    }

    #[cfg(test)]
    pub(crate) fn cache_lookups(&self, result: &str) -> u64 {
        self.cache_lookups.with_label_values(&[result]).get()
    }
}
