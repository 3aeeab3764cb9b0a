pub mod config;
pub mod model;

use std::{
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
    sync::LazyLock,
    time::Duration,
};

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const PROJECT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const PROJECT_NAME: &str = "ipscope";

pub const PROGRAM_NAME: &str = "ipscope";
pub const CONFIG_NAME: &str = "ipscope.yaml";

pub const DEFAULT_WEB_PORT: u16 = 5500;
pub const DEFAULT_WEB_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

pub const DEFAULT_METRICS_PORT: u16 = 5501;
pub const DEFAULT_METRICS_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Upper bound for a single provider request, body included.
pub const DEFAULT_GEO_REQUEST_TIMEOUT: Duration = Duration::from_millis(3_000);

/// How long a successful lookup is served from the cache.
pub const DEFAULT_GEO_CACHE_TTL: Duration = Duration::from_millis(60_000);

pub static PROJECT_CONFIG_DIR: LazyLock<PathBuf> = LazyLock::new(|| {
    ProjectDirs::from("", PROJECT_NAME, PROJECT_NAME)
        .map_or_else(|| PathBuf::from("."), |dirs| dirs.config_dir().to_path_buf())
});

#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub version: String,
    pub branch: String,
    pub commit_hash: String,
    pub start_time: DateTime<Utc>,
}
