use std::time::Duration;

use ipscope_core::config::{ProviderEndpoints, ProviderUrls};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};

#[serde_as]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GeoConfig {
    /// Deadline of a single provider request, in milliseconds.
    #[serde(default = "GeoConfig::default_request_timeout")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub request_timeout: Duration,

    /// How long a successful lookup is reused, in milliseconds.
    #[serde(default = "GeoConfig::default_cache_ttl")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub cache_ttl: Duration,

    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl GeoConfig {
    #[inline]
    pub const fn default_request_timeout() -> Duration {
        ipscope_core::DEFAULT_GEO_REQUEST_TIMEOUT
    }

    #[inline]
    pub const fn default_cache_ttl() -> Duration { ipscope_core::DEFAULT_GEO_CACHE_TTL }
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            request_timeout: Self::default_request_timeout(),
            cache_ttl: Self::default_cache_ttl(),
            providers: ProvidersConfig::default(),
        }
    }
}

/// Provider URL templates. `{ip}` in an `address_url` is replaced with the
/// looked up address.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ProvidersConfig {
    #[serde(default = "ProvidersConfig::default_primary")]
    pub primary: ProviderUrlsConfig,

    #[serde(default = "ProvidersConfig::default_secondary")]
    pub secondary: ProviderUrlsConfig,

    #[serde(default = "ProvidersConfig::default_ip_echo_url")]
    pub ip_echo_url: String,
}

impl ProvidersConfig {
    fn default_primary() -> ProviderUrlsConfig { ProviderEndpoints::default().primary.into() }

    fn default_secondary() -> ProviderUrlsConfig { ProviderEndpoints::default().secondary.into() }

    fn default_ip_echo_url() -> String { ProviderEndpoints::default().ip_echo_url }
}

impl Default for ProvidersConfig {
    fn default() -> Self { ProviderEndpoints::default().into() }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ProviderUrlsConfig {
    pub address_url: String,

    pub caller_url: String,
}

impl From<ProviderUrls> for ProviderUrlsConfig {
    fn from(ProviderUrls { address_url, caller_url }: ProviderUrls) -> Self {
        Self { address_url, caller_url }
    }
}

impl From<ProviderUrlsConfig> for ProviderUrls {
    fn from(ProviderUrlsConfig { address_url, caller_url }: ProviderUrlsConfig) -> Self {
        Self { address_url, caller_url }
    }
}

impl From<ProviderEndpoints> for ProvidersConfig {
    fn from(ProviderEndpoints { primary, secondary, ip_echo_url }: ProviderEndpoints) -> Self {
        Self { primary: primary.into(), secondary: secondary.into(), ip_echo_url }
    }
}

impl From<GeoConfig> for ipscope_core::config::GeoConfig {
    fn from(GeoConfig { request_timeout, cache_ttl, providers }: GeoConfig) -> Self {
        let ProvidersConfig { primary, secondary, ip_echo_url } = providers;

        Self {
            request_timeout,
            cache_ttl,
            providers: ProviderEndpoints {
                primary: primary.into(),
                secondary: secondary.into(),
                ip_echo_url,
            },
        }
    }
}
