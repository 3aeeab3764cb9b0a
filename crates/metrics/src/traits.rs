/// Source of metric families served on the `/metrics` endpoint.
pub trait Metrics: Clone + Send + Sync {
    fn gather(&self) -> Vec<prometheus::proto::MetricFamily>;
}
