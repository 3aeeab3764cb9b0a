use std::sync::Arc;

use ipscope_core::{
    config::ProviderEndpoints,
    model::{GeoResult, LookupTarget, Provider},
};

use super::{
    fallback::{FallbackChain, Query},
    GeoCache, GeoCounters,
};
use crate::provider_client::GeoLookup;

/// Geolocation of a caller whose own address is not routable.
#[derive(Clone, Debug, PartialEq)]
pub struct CallerGeo {
    pub geo: GeoResult,

    /// Public address reported by a provider, if any looked plausible.
    pub public_ip: Option<String>,
}

/// Runs fallback chains against the configured providers behind a shared
/// cache.
#[derive(Clone)]
pub struct GeoResolver {
    lookup: Arc<dyn GeoLookup>,
    endpoints: Arc<ProviderEndpoints>,
    cache: GeoCache,
    counters: GeoCounters,
}

impl GeoResolver {
    #[must_use]
    pub fn new(
        lookup: Arc<dyn GeoLookup>,
        endpoints: ProviderEndpoints,
        cache: GeoCache,
        counters: GeoCounters,
    ) -> Self {
        Self { lookup, endpoints: Arc::new(endpoints), cache, counters }
    }

    /// Send a single query, bypassing the cache.
    pub async fn query(&self, Query { provider, target }: &Query) -> GeoResult {
        let url = self.endpoints.url(*provider, target);
        tracing::debug!(%provider, %target, %url, "Querying geo provider");

        let result = self.lookup.lookup(&url).await;
        self.counters.provider_outcome(*provider, &result);

        if let Some(failure) = result.failure() {
            tracing::warn!(%provider, %target, status = ?failure.status, "{}", failure.error);
        } else if result.is_error() {
            tracing::warn!(%provider, %target, "Geo provider reported an error");
        }

        result
    }

    /// Result for `target` from the cache, or from running `chain` on a miss.
    async fn cached(&self, target: &LookupTarget, chain: &FallbackChain) -> GeoResult {
        if let Some(result) = self.cache.get(target).await {
            tracing::trace!(key = %target.cache_key(), "Geo cache hit");
            self.counters.cache_lookup(true);
            return result;
        }
        self.counters.cache_lookup(false);

        let result = chain.run(self).await;
        self.cache.set(target.clone(), result.clone()).await;
        result
    }

    /// Geolocation of a public address.
    pub async fn resolve_public(&self, address: &str) -> GeoResult {
        self.cached(&LookupTarget::address(address), &FallbackChain::public_address(address)).await
    }

    /// Geolocation of a caller with a private, loopback or unknown address.
    ///
    /// The caller's public address is inferred by the providers first. When
    /// one is reported, a second lookup for exactly that address is preferred
    /// over the inferred answer, falling back to the inferred answer if it
    /// fails.
    pub async fn resolve_caller(&self) -> CallerGeo {
        let base = self.cached(&LookupTarget::Caller, &FallbackChain::caller()).await;

        let Some(public_ip) = base.plausible_ip().map(str::to_string) else {
            return CallerGeo { geo: base, public_ip: None };
        };

        let target = LookupTarget::address(public_ip.as_str());
        let detail = self
            .cached(&target, &FallbackChain::single(Query::new(Provider::Primary, target.clone())))
            .await;

        let geo = if detail.is_success() { detail } else { base };
        CallerGeo { geo, public_ip: Some(public_ip) }
    }

    #[cfg(test)]
    pub(crate) const fn counters(&self) -> &GeoCounters { &self.counters }
}
