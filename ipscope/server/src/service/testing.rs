use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use ipscope_core::{
    config::{ProviderEndpoints, ProviderUrls},
    model::GeoResult,
};
use prometheus::Registry;

use super::{geo_cache::tests::ManualClock, GeoCache, GeoCounters, GeoResolver};
use crate::provider_client::GeoLookup;

pub(crate) const PRIMARY: &str = "http://primary.test";
pub(crate) const SECONDARY: &str = "http://secondary.test";
pub(crate) const IP_ECHO: &str = "http://echo.test/";

pub(crate) fn endpoints() -> ProviderEndpoints {
    ProviderEndpoints {
        primary: ProviderUrls {
            address_url: format!("{PRIMARY}/{{ip}}"),
            caller_url: format!("{PRIMARY}/"),
        },
        secondary: ProviderUrls {
            address_url: format!("{SECONDARY}/{{ip}}"),
            caller_url: format!("{SECONDARY}/"),
        },
        ip_echo_url: IP_ECHO.to_string(),
    }
}

/// [`GeoLookup`] answering from a fixed table and counting calls per URL.
///
/// URLs without a scripted answer fail like an unreachable host.
#[derive(Clone, Debug, Default)]
pub(crate) struct ScriptedLookup {
    responses: Arc<Mutex<HashMap<String, GeoResult>>>,
    calls: Arc<Mutex<HashMap<String, usize>>>,
}

impl ScriptedLookup {
    pub(crate) fn new() -> Self { Self::default() }

    pub(crate) fn respond(self, url: &str, result: GeoResult) -> Self {
        drop(self.responses.lock().unwrap().insert(url.to_string(), result));
        self
    }

    pub(crate) fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or_default()
    }

    pub(crate) fn total_calls(&self) -> usize { self.calls.lock().unwrap().values().sum() }

    /// Resolver over this lookup with a fresh cache, clock and registry.
    pub(crate) fn resolver(&self) -> GeoResolver { self.resolver_with_cache(Self::cache().0) }

    pub(crate) fn resolver_with_cache(&self, cache: GeoCache) -> GeoResolver {
        let counters = GeoCounters::register(&Registry::new()).unwrap();
        GeoResolver::new(Arc::new(self.clone()), endpoints(), cache, counters)
    }

    pub(crate) fn cache() -> (GeoCache, Arc<ManualClock>) {
        let clock = ManualClock::new();
        (GeoCache::with_clock(Duration::from_secs(60), clock.clone()), clock)
    }
}

#[async_trait]
impl GeoLookup for ScriptedLookup {
    async fn lookup(&self, url: &str) -> GeoResult {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;

        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| GeoResult::fetch_failed(format!("no scripted response for {url}")))
    }
}
