use std::fmt::{self, Display, Formatter};

/// Rendered key of lookups that let the provider infer the caller's address.
pub const CALLER_CACHE_KEY: &str = "ip:public";

/// The upstream services a lookup can be sent to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Full geolocation lookup, queried first.
    Primary,
    /// Geolocation lookup used when the primary provider fails.
    Secondary,
    /// Reports the public address of the caller and nothing else.
    IpEcho,
}

impl Provider {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::IpEcho => "ip_echo",
        }
    }
}

impl Display for Provider {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// What a lookup asks the provider about.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LookupTarget {
    /// Whatever address the provider sees the request coming from.
    Caller,
    Address(String),
}

impl LookupTarget {
    #[inline]
    #[must_use]
    pub fn address(address: impl Into<String>) -> Self { Self::Address(address.into()) }

    /// Key of this lookup as shown in logs.
    ///
    /// An address spelled `public` renders like [`LookupTarget::Caller`];
    /// compare targets, not keys.
    #[must_use]
    pub fn cache_key(&self) -> String {
        match self {
            Self::Caller => CALLER_CACHE_KEY.to_string(),
            Self::Address(address) => format!("ip:{}", urlencoding::encode(address)),
        }
    }
}

impl Display for LookupTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Caller => f.write_str("caller"),
            Self::Address(address) => f.write_str(address),
        }
    }
}
