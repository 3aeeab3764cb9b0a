mod counters;
pub mod fallback;
pub mod geo_cache;
mod request_metrics;
mod resolver;

#[cfg(test)]
mod testing;

pub use self::{
    counters::GeoCounters,
    geo_cache::{Clock, GeoCache, SystemClock},
    request_metrics::{MetricsBuilder, RequestMetadata},
    resolver::{CallerGeo, GeoResolver},
};
