use std::{
    fmt::{self, Display, Formatter},
    sync::LazyLock,
};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static DOTTED_QUAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{1,3}(?:\.[0-9]{1,3}){3}$").expect("dotted quad pattern is valid")
});

/// Outcome of a single provider lookup, or of a whole fallback chain.
///
/// Both variants serialize to a plain JSON value. The failure variant always
/// carries an `error` field, which is how consumers of the rendered payload
/// tell the two apart.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum GeoResult {
    Failure(GeoFailure),
    /// Provider payload, passed through untouched.
    Success(Value),
}

impl GeoResult {
    #[must_use]
    pub const fn lookup_failed(status: u16, body: Value) -> Self {
        Self::Failure(GeoFailure {
            error: FailureKind::LookupFailed,
            status: Some(status),
            body: Some(body),
            message: None,
        })
    }

    #[must_use]
    pub const fn non_json(status: u16, body: String) -> Self {
        Self::Failure(GeoFailure {
            error: FailureKind::NonJsonResponse,
            status: Some(status),
            body: Some(Value::String(body)),
            message: None,
        })
    }

    #[must_use]
    pub fn fetch_failed(message: impl Into<String>) -> Self {
        Self::Failure(GeoFailure {
            error: FailureKind::FetchFailed,
            status: None,
            body: None,
            message: Some(message.into()),
        })
    }

    /// Whether this result must not be trusted or cached.
    ///
    /// Besides our own failure variant, a provider payload that reports a
    /// truthy `error` field is an error as well; ipapi.co signals rate limiting
    /// with `{"error": true, "reason": "RateLimited"}`, sometimes with a 200.
    #[must_use]
    pub fn is_error(&self) -> bool {
        match self {
            Self::Failure(_) => true,
            Self::Success(payload) => payload.get("error").is_some_and(is_truthy),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool { !self.is_error() }

    /// The `ip` field reported by the provider, if it is a string.
    #[must_use]
    pub fn reported_ip(&self) -> Option<&str> {
        match self {
            Self::Failure(_) => None,
            Self::Success(payload) => payload.get("ip").and_then(Value::as_str),
        }
    }

    /// The reported `ip`, when it passes [`looks_like_ip`].
    #[must_use]
    pub fn plausible_ip(&self) -> Option<&str> { self.reported_ip().filter(|ip| looks_like_ip(ip)) }

    #[must_use]
    pub const fn failure(&self) -> Option<&GeoFailure> {
        match self {
            Self::Failure(failure) => Some(failure),
            Self::Success(_) => None,
        }
    }

    /// Field `key` of a provider payload.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Failure(_) => None,
            Self::Success(payload) => payload.get(key),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GeoFailure {
    pub error: FailureKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Decoded JSON body, or the raw text when it was not JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum FailureKind {
    #[serde(rename = "Geo lookup failed")]
    LookupFailed,
    #[serde(rename = "Geo lookup returned non-JSON response")]
    NonJsonResponse,
    #[serde(rename = "Geo lookup fetch failed")]
    FetchFailed,
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::LookupFailed => write!(f, "Geo lookup failed"),
            Self::NonJsonResponse => write!(f, "Geo lookup returned non-JSON response"),
            Self::FetchFailed => write!(f, "Geo lookup fetch failed"),
        }
    }
}

/// Format-only address check for values reported by providers.
///
/// A dotted quad of one to three digit groups counts as IPv4 and anything
/// containing a colon counts as IPv6. Octet ranges are not validated.
#[must_use]
pub fn looks_like_ip(value: &str) -> bool { DOTTED_QUAD.is_match(value) || value.contains(':') }

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
