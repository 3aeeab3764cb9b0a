use http::HeaderMap;
use ipscope_axum::{client_address, header_text};
use ipscope_core::model::{AddressClass, MetricsResponse, RequestHeaders};

use super::GeoResolver;

/// What the metrics builder needs to know about an incoming request.
#[derive(Clone, Debug, Default)]
pub struct RequestMetadata {
    pub headers: HeaderMap,

    /// Peer address of the connection, if the transport reports one.
    pub remote_address: Option<String>,
}

#[derive(Clone)]
pub struct MetricsBuilder {
    resolver: GeoResolver,
}

impl MetricsBuilder {
    #[must_use]
    pub const fn new(resolver: GeoResolver) -> Self { Self { resolver } }

    /// Build the metrics response for one request.
    ///
    /// Never fails; provider problems end up inside the `geo` field.
    pub async fn build(&self, request: &RequestMetadata) -> MetricsResponse {
        let ip = client_address(&request.headers, request.remote_address.as_deref());
        let class = AddressClass::classify(&ip);

        let (geo, effective_ip) = if class.is_public() {
            tracing::debug!(%ip, "Resolving public client address");
            (self.resolver.resolve_public(&ip).await, ip.clone())
        } else {
            tracing::debug!(%ip, "Client address is not routable, resolving the caller");
            let caller = self.resolver.resolve_caller().await;
            (caller.geo, caller.public_ip.unwrap_or_else(|| ip.clone()))
        };

        MetricsResponse {
            ip,
            effective_ip,
            ip_version: class.version,
            geo,
            headers: RequestHeaders {
                user_agent: header_text(&request.headers, http::header::USER_AGENT.as_str()),
                accept_language: header_text(&request.headers, http::header::ACCEPT_LANGUAGE.as_str()),
            },
        }
    }
}
