use std::borrow::Cow;

use http::HeaderMap;

pub mod response;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

const IPV4_MAPPED_PREFIX: &str = "::ffff:";

/// Candidate client address of a request, normalized.
///
/// `X-Forwarded-For` wins over the transport-level `remote_address`; when
/// neither is present (or both are empty) the result is the empty string,
/// which callers treat as an unknown, non-routable address.
///
/// A forwarded-for value that is not visible ASCII is decoded lossily rather
/// than skipped.
#[must_use]
pub fn client_address(headers: &HeaderMap, remote_address: Option<&str>) -> String {
    let forwarded_for = headers
        .get(X_FORWARDED_FOR)
        .map(|value| String::from_utf8_lossy(value.as_bytes()))
        .filter(|value| !value.is_empty());
    let remote_address = remote_address.filter(|value| !value.is_empty());

    tracing::debug!(?forwarded_for, ?remote_address);

    forwarded_for
        .or_else(|| remote_address.map(Cow::Borrowed))
        .map(|address| normalize_address(&address))
        .unwrap_or_default()
}

/// Normalize a raw address as it appears in request metadata.
///
/// Only the first hop of a comma separated proxy chain is kept, the value is
/// lowercased and the IPv4-mapped IPv6 prefix (`::ffff:`) is removed.
///
/// ```
/// use ipscope_axum::normalize_address;
///
/// assert_eq!(normalize_address("::ffff:203.0.113.5"), "203.0.113.5");
/// assert_eq!(normalize_address("1.2.3.4, 5.6.7.8"), "1.2.3.4");
/// assert_eq!(normalize_address(""), "");
/// ```
#[must_use]
pub fn normalize_address(raw: &str) -> String {
    let first_hop = raw.split(',').next().unwrap_or_default().trim().to_lowercase();

    match first_hop.strip_prefix(IPV4_MAPPED_PREFIX) {
        Some(address) => address.to_string(),
        None => first_hop,
    }
}

/// Value of the header `name`, or the empty string when it is absent or not
/// visible ASCII.
#[must_use]
pub fn header_text(headers: &HeaderMap, name: &str) -> String {
    header_value(headers, name).unwrap_or_default().to_string()
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
