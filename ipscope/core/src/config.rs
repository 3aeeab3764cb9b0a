use std::{fmt::Debug, net::SocketAddr, path::PathBuf, time::Duration};

use crate::model::{LookupTarget, Provider};

/// Placeholder replaced by the percent-encoded address in provider URLs.
pub const ADDRESS_PLACEHOLDER: &str = "{ip}";

#[derive(Clone, Debug)]
pub struct Config {
    pub web: WebConfig,

    pub metrics: MetricsConfig,

    pub geo: GeoConfig,
}

#[derive(Clone, Debug)]
pub struct WebConfig {
    pub listen_address: SocketAddr,

    /// Directory served for any path no route matches.
    pub static_dir: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct MetricsConfig {
    pub enable: bool,

    pub listen_address: SocketAddr,
}

#[derive(Clone, Debug)]
pub struct GeoConfig {
    pub request_timeout: Duration,

    pub cache_ttl: Duration,

    pub providers: ProviderEndpoints,
}

/// URL templates of one geolocation provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderUrls {
    /// Lookup of a given address, containing [`ADDRESS_PLACEHOLDER`].
    pub address_url: String,

    /// Lookup of the address the request originates from.
    pub caller_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub primary: ProviderUrls,

    pub secondary: ProviderUrls,

    /// Endpoint that only echoes the caller's public address.
    pub ip_echo_url: String,
}

impl ProviderEndpoints {
    /// URL to query `provider` about `target`.
    ///
    /// The IP echo service has no per-address lookup and always gets its
    /// single URL.
    #[must_use]
    pub fn url(&self, provider: Provider, target: &LookupTarget) -> String {
        let urls = match provider {
            Provider::Primary => &self.primary,
            Provider::Secondary => &self.secondary,
            Provider::IpEcho => return self.ip_echo_url.clone(),
        };

        match target {
            LookupTarget::Caller => urls.caller_url.clone(),
            LookupTarget::Address(address) => {
                urls.address_url.replace(ADDRESS_PLACEHOLDER, &urlencoding::encode(address))
            }
        }
    }
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            primary: ProviderUrls {
                address_url: "https://ipapi.co/{ip}/json/".to_string(),
                caller_url: "https://ipapi.co/json/".to_string(),
            },
            secondary: ProviderUrls {
                address_url: "https://ipwho.is/{ip}".to_string(),
                caller_url: "https://ipwho.is/".to_string(),
            },
            ip_echo_url: "https://api.ipify.org?format=json".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ProviderEndpoints;
    use crate::model::{LookupTarget, Provider};

    #[test]
    fn test_default_urls() {
        let endpoints = ProviderEndpoints::default();

        assert_eq!(
            endpoints.url(Provider::Primary, &LookupTarget::address("103.172.179.24")),
            "https://ipapi.co/103.172.179.24/json/"
        );
        assert_eq!(endpoints.url(Provider::Primary, &LookupTarget::Caller), "https://ipapi.co/json/");
        assert_eq!(
            endpoints.url(Provider::Secondary, &LookupTarget::address("2001:db8::1")),
            "https://ipwho.is/2001%3Adb8%3A%3A1"
        );
        assert_eq!(endpoints.url(Provider::Secondary, &LookupTarget::Caller), "https://ipwho.is/");
        assert_eq!(
            endpoints.url(Provider::IpEcho, &LookupTarget::address("8.8.8.8")),
            "https://api.ipify.org?format=json"
        );
    }

    #[test]
    fn test_address_is_percent_encoded() {
        let endpoints = ProviderEndpoints::default();
        assert_eq!(
            endpoints.url(Provider::Primary, &LookupTarget::address("1.2.3.4/../admin")),
            "https://ipapi.co/1.2.3.4%2F..%2Fadmin/json/"
        );
    }
}
