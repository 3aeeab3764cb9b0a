//! Provider fallback policies.
//!
//! A [`FallbackChain`] starts with one lookup whose result is always kept.
//! While the kept result is an error, the next [`Attempt`] runs; an attempt
//! replaces the kept result only if its own result passes the attempt's
//! [`Acceptance`] check. When every attempt is rejected the error of the
//! initial lookup is what the chain returns.

use ipscope_core::model::{GeoResult, LookupTarget, Provider};

use super::GeoResolver;

/// Which results an attempt is allowed to hand back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Acceptance {
    /// Any non-error result.
    Success,
    /// A non-error result whose `ip` field looks like an address.
    SuccessWithPlausibleIp,
}

impl Acceptance {
    #[must_use]
    pub fn accepts(self, result: &GeoResult) -> bool {
        match self {
            Self::Success => result.is_success(),
            Self::SuccessWithPlausibleIp => {
                result.is_success() && result.plausible_ip().is_some()
            }
        }
    }
}

/// One provider request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    pub provider: Provider,
    pub target: LookupTarget,
}

impl Query {
    #[must_use]
    pub const fn new(provider: Provider, target: LookupTarget) -> Self { Self { provider, target } }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Attempt {
    /// Send `query` and keep the answer if `acceptance` allows it.
    Lookup { query: Query, acceptance: Acceptance },

    /// Ask `discover` for the caller's public address, then look that address
    /// up with `then`. Both answers must be successful.
    DiscoverThenLookup { discover: Provider, then: Provider },
}

impl Attempt {
    /// Run this attempt, returning its result only if it is acceptable.
    pub async fn run(&self, resolver: &GeoResolver) -> Option<GeoResult> {
        match self {
            Self::Lookup { query, acceptance } => {
                let result = resolver.query(query).await;
                if acceptance.accepts(&result) {
                    Some(result)
                } else {
                    tracing::debug!(provider = %query.provider, target = %query.target, "Fallback result rejected");
                    None
                }
            }
            Self::DiscoverThenLookup { discover, then } => {
                let echo = resolver.query(&Query::new(*discover, LookupTarget::Caller)).await;
                if !Acceptance::SuccessWithPlausibleIp.accepts(&echo) {
                    tracing::debug!(provider = %discover, "Could not discover the public address");
                    return None;
                }
                let address = echo.plausible_ip()?.to_string();

                tracing::debug!(provider = %discover, %address, "Discovered public address");
                let result = resolver.query(&Query::new(*then, LookupTarget::Address(address))).await;
                Acceptance::Success.accepts(&result).then_some(result)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FallbackChain {
    initial: Query,
    fallbacks: Vec<Attempt>,
}

impl FallbackChain {
    /// A chain without fallbacks.
    #[must_use]
    pub const fn single(query: Query) -> Self { Self { initial: query, fallbacks: Vec::new() } }

    #[must_use]
    pub fn then(mut self, attempt: Attempt) -> Self {
        self.fallbacks.push(attempt);
        self
    }

    /// Lookup of a public client address: primary, then secondary.
    #[must_use]
    pub fn public_address(address: &str) -> Self {
        let target = LookupTarget::address(address);

        Self::single(Query::new(Provider::Primary, target.clone())).then(Attempt::Lookup {
            query: Query::new(Provider::Secondary, target),
            acceptance: Acceptance::SuccessWithPlausibleIp,
        })
    }

    /// Lookup of a caller whose own address is not routable.
    ///
    /// The primary provider is asked to infer the address itself. If that
    /// fails the IP echo service is used to discover it and the primary
    /// provider is asked again, and as a last resort the secondary provider is
    /// asked to infer it.
    #[must_use]
    pub fn caller() -> Self {
        Self::single(Query::new(Provider::Primary, LookupTarget::Caller))
            .then(Attempt::DiscoverThenLookup { discover: Provider::IpEcho, then: Provider::Primary })
            .then(Attempt::Lookup {
                query: Query::new(Provider::Secondary, LookupTarget::Caller),
                acceptance: Acceptance::SuccessWithPlausibleIp,
            })
    }

    #[inline]
    #[must_use]
    pub fn attempts(&self) -> &[Attempt] { &self.fallbacks }

    pub async fn run(&self, resolver: &GeoResolver) -> GeoResult {
        let mut current = resolver.query(&self.initial).await;

        for attempt in &self.fallbacks {
            if current.is_success() {
                break;
            }
            if let Some(result) = attempt.run(resolver).await {
                current = result;
            }
        }

        current
    }
}
