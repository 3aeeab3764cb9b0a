use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{GeoResult, IpVersion};

/// Payload of `GET /api/metrics`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, ToSchema)]
pub struct MetricsResponse {
    /// Normalized client address as seen by this service.
    pub ip: String,

    /// Address the geolocation refers to. Differs from `ip` when the client
    /// is local and a provider reported its public address.
    pub effective_ip: String,

    pub ip_version: IpVersion,

    /// Provider payload, or an object with an `error` field.
    #[schema(value_type = Object)]
    pub geo: GeoResult,

    pub headers: RequestHeaders,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
pub struct RequestHeaders {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,
}
