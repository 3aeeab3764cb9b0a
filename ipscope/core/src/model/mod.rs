// Types shared by the resolver and the HTTP layer.

mod address;
mod geo;
mod provider;
mod response;

pub use self::{
    address::{is_private_or_local, AddressClass, AddressScope, IpVersion},
    geo::{looks_like_ip, FailureKind, GeoFailure, GeoResult},
    provider::{LookupTarget, Provider, CALLER_CACHE_KEY},
    response::{MetricsResponse, RequestHeaders},
};
