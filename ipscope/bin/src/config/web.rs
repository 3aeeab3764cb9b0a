use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
};

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct WebConfig {
    #[serde(default = "WebConfig::default_host")]
    pub host: IpAddr,

    #[serde(default = "WebConfig::default_port")]
    pub port: u16,

    /// Directory served for paths without a route, e.g. a built front-end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
}

impl WebConfig {
    #[inline]
    pub const fn socket_address(&self) -> SocketAddr { SocketAddr::new(self.host, self.port) }

    #[inline]
    pub const fn default_host() -> IpAddr { ipscope_core::DEFAULT_WEB_HOST }

    #[inline]
    pub const fn default_port() -> u16 { ipscope_core::DEFAULT_WEB_PORT }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self { host: Self::default_host(), port: Self::default_port(), static_dir: None }
    }
}

impl From<WebConfig> for ipscope_core::config::WebConfig {
    fn from(config: WebConfig) -> Self {
        Self { listen_address: config.socket_address(), static_dir: config.static_dir }
    }
}
