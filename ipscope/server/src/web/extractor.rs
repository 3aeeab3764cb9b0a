use std::{net::SocketAddr, result::Result};

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};

use crate::service::RequestMetadata;

/// Headers and peer address of the request being served.
///
/// The peer address is only known when the router was turned into a service
/// with connect info; otherwise it is `None`.
#[derive(Clone, Debug)]
pub struct ClientRequest(pub RequestMetadata);

#[async_trait]
impl<S> FromRequestParts<S> for ClientRequest
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let remote_address = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(address)| address.ip().to_string());

        Ok(Self(RequestMetadata { headers: parts.headers.clone(), remote_address }))
    }
}
