use std::{
    fmt::{self, Display, Formatter},
    sync::LazyLock,
};

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const LOOPBACK_LITERALS: [&str; 3] = ["::1", "0:0:0:0:0:0:0:1", "127.0.0.1"];
const PRIVATE_V4_PREFIXES: [&str; 3] = ["10.", "192.168.", "169.254."];
const PRIVATE_V6_PREFIXES: [&str; 3] = ["fc", "fd", "fe80:"];

// 172.16.0.0/12
static PRIVATE_172_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^172\.(1[6-9]|2[0-9]|3[01])\.").expect("172.16/12 pattern is valid")
});

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash, ToSchema)]
pub enum IpVersion {
    #[serde(rename = "IPv4")]
    V4,
    #[serde(rename = "IPv6")]
    V6,
}

impl IpVersion {
    /// Anything with a colon is treated as IPv6.
    #[must_use]
    pub fn of(address: &str) -> Self { if address.contains(':') { Self::V6 } else { Self::V4 } }
}

impl Display for IpVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4 => write!(f, "IPv4"),
            Self::V6 => write!(f, "IPv6"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressScope {
    /// Loopback, private, link-local, unique-local, or unknown.
    Private,
    Public,
}

/// Scope and version of a normalized client address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AddressClass {
    pub version: IpVersion,
    pub scope: AddressScope,
}

impl AddressClass {
    /// Classify a normalized address.
    ///
    /// This is a textual check on purpose: forwarded headers may carry values
    /// that do not parse as an [`std::net::IpAddr`], and those still need a
    /// class. The empty string is private.
    #[must_use]
    pub fn classify(address: &str) -> Self {
        let scope = if is_private_or_local(address) {
            AddressScope::Private
        } else {
            AddressScope::Public
        };

        Self { version: IpVersion::of(address), scope }
    }

    #[inline]
    #[must_use]
    pub fn is_public(&self) -> bool { self.scope == AddressScope::Public }
}

/// Rules are evaluated in order and the first match wins.
#[must_use]
pub fn is_private_or_local(address: &str) -> bool {
    address.is_empty()
        || LOOPBACK_LITERALS.contains(&address)
        || PRIVATE_V4_PREFIXES.iter().any(|prefix| address.starts_with(prefix))
        || PRIVATE_172_RANGE.is_match(address)
        || PRIVATE_V6_PREFIXES.iter().any(|prefix| address.starts_with(prefix))
}
