mod error;
mod geo;
mod metrics;
mod web;

use std::path::{Path, PathBuf};

use ipscope_cli_common::config::LogConfig;
use ipscope_core::config::ADDRESS_PLACEHOLDER;
use resolve_path::PathResolveExt;
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt};

pub use self::{
    error::Error,
    geo::{GeoConfig, ProvidersConfig},
    metrics::MetricsConfig,
    web::WebConfig,
};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub web: WebConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    #[serde(default)]
    pub geo: GeoConfig,
}

impl Config {
    #[inline]
    pub fn default_path() -> PathBuf {
        [ipscope_core::PROJECT_CONFIG_DIR.to_path_buf(), PathBuf::from(ipscope_core::CONFIG_NAME)]
            .into_iter()
            .collect()
    }

    /// Read the configuration at `path`.
    ///
    /// Relative or `~` prefixed file paths inside the file are resolved, and
    /// provider URL templates are checked for the address placeholder.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let data = std::fs::read_to_string(&path)
            .context(error::OpenConfigSnafu { filename: path.as_ref().to_path_buf() })?;

        Self::from_yaml(&data, path.as_ref())
    }

    fn from_yaml(data: &str, filename: &Path) -> Result<Self, Error> {
        let mut config: Self = serde_yaml::from_str(data)
            .context(error::ParseConfigSnafu { filename: filename.to_path_buf() })?;

        config.log.file_path = config.log.file_path.map(resolve_file_path).transpose()?;
        config.web.static_dir = config.web.static_dir.map(resolve_file_path).transpose()?;

        let ProvidersConfig { primary, secondary, .. } = &config.geo.providers;
        for url in [&primary.address_url, &secondary.address_url] {
            ensure!(
                url.contains(ADDRESS_PLACEHOLDER),
                error::MissingAddressPlaceholderSnafu { url: url.clone() }
            );
        }

        Ok(config)
    }
}

fn resolve_file_path(path: PathBuf) -> Result<PathBuf, Error> {
    path.try_resolve()
        .map(|resolved| resolved.to_path_buf())
        .with_context(|_| error::ResolveFilePathSnafu { file_path: path.clone() })
}

impl From<Config> for ipscope_core::config::Config {
    fn from(Config { web, metrics, geo, .. }: Config) -> Self {
        Self { web: web.into(), metrics: metrics.into(), geo: geo.into() }
    }
}

#[cfg(test)]
mod tests {
    use std::{path::Path, time::Duration};

    use super::{Config, Error};

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_yaml("{}", Path::new("ipscope.yaml")).unwrap();

        assert_eq!(config.web.port, 5500);
        assert!(!config.metrics.enable);
        assert_eq!(config.metrics.port, 5501);
        assert_eq!(config.geo.request_timeout, Duration::from_millis(3_000));
        assert_eq!(config.geo.cache_ttl, Duration::from_millis(60_000));
        assert_eq!(config.geo.providers.primary.address_url, "https://ipapi.co/{ip}/json/");
    }

    #[test]
    fn test_partial_geo_section() {
        let yaml = r"
geo:
  request_timeout: 1500
  providers:
    secondary:
      address_url: http://localhost:8080/lookup/{ip}
      caller_url: http://localhost:8080/lookup
";
        let config = Config::from_yaml(yaml, Path::new("ipscope.yaml")).unwrap();

        assert_eq!(config.geo.request_timeout, Duration::from_millis(1_500));
        assert_eq!(config.geo.cache_ttl, Duration::from_millis(60_000));
        assert_eq!(config.geo.providers.primary.caller_url, "https://ipapi.co/json/");
        assert_eq!(config.geo.providers.secondary.caller_url, "http://localhost:8080/lookup");
        assert_eq!(config.geo.providers.ip_echo_url, "https://api.ipify.org?format=json");
    }

    #[test]
    fn test_address_url_without_placeholder() {
        let yaml = r"
geo:
  providers:
    primary:
      address_url: https://ipapi.co/json/
      caller_url: https://ipapi.co/json/
";
        let result = Config::from_yaml(yaml, Path::new("ipscope.yaml"));

        assert!(matches!(result, Err(Error::MissingAddressPlaceholder { .. })));
    }

    #[test]
    fn test_default_config_round_trips() {
        let text = serde_yaml::to_string(&Config::default()).unwrap();
        let config = Config::from_yaml(&text, Path::new("ipscope.yaml")).unwrap();

        assert_eq!(config.geo, Config::default().geo);
        assert_eq!(config.web, Config::default().web);
    }

    #[test]
    fn test_into_server_config() {
        let config: ipscope_core::config::Config = Config::default().into();

        assert_eq!(config.web.listen_address.to_string(), "127.0.0.1:5500");
        assert_eq!(config.geo.providers, ipscope_core::config::ProviderEndpoints::default());
    }
}
