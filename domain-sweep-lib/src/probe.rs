//! Availability probing over DNS.
//!
//! A probe is one bounded-time name lookup. It never retries and never touches
//! shared state: it returns a [`ProbeOutcome`] and leaves aggregation to the
//! scheduler.
//!
//! Classification:
//! - any address returned → `Unavailable`
//! - NXDOMAIN or an empty answer → `Available`
//! - anything else, including the timeout expiring → `Error`

use crate::error::SweepError;
use crate::types::ProbeOutcome;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::ResolveErrorKind;
use trust_dns_resolver::proto::op::ResponseCode;
use trust_dns_resolver::TokioAsyncResolver;

/// Raw result of a name lookup, before classification.
#[derive(Debug, Clone)]
pub enum Lookup {
    /// At least one address record came back
    Found,

    /// The name does not exist, or exists without address data
    NotFound,

    /// The lookup failed for any other reason
    Failed(SweepError),
}

/// Anything that can look a domain name up.
///
/// [`DnsResolver`] is the production implementation; tests plug in scripted
/// resolvers with controlled latencies.
pub trait Resolver: Send + Sync {
    fn lookup<'a>(&'a self, domain: &'a str) -> BoxFuture<'a, Lookup>;
}

impl<T: Resolver + ?Sized> Resolver for Arc<T> {
    fn lookup<'a>(&'a self, domain: &'a str) -> BoxFuture<'a, Lookup> {
        (**self).lookup(domain)
    }
}

impl<T: Resolver + ?Sized> Resolver for Box<T> {
    fn lookup<'a>(&'a self, domain: &'a str) -> BoxFuture<'a, Lookup> {
        (**self).lookup(domain)
    }
}

/// Probe one domain, giving up after `timeout`.
pub async fn probe<R: Resolver + ?Sized>(
    resolver: &R,
    domain: &str,
    timeout: Duration,
) -> ProbeOutcome {
    match tokio::time::timeout(timeout, resolver.lookup(domain)).await {
        Ok(Lookup::Found) => ProbeOutcome::Unavailable,
        Ok(Lookup::NotFound) => ProbeOutcome::Available,
        Ok(Lookup::Failed(err)) => {
            debug!(domain, error = %err, "lookup failed");
            ProbeOutcome::Error
        }
        Err(_) => {
            let err = SweepError::timeout(format!("DNS lookup for {}", domain), timeout);
            debug!(domain, error = %err, "lookup timed out");
            ProbeOutcome::Error
        }
    }
}

/// DNS resolver backed by `trust-dns-resolver`.
///
/// Configured for a single attempt so the only retry policy is "none".
#[derive(Clone)]
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl DnsResolver {
    /// Resolver using the public default upstreams.
    pub fn new(timeout: Duration) -> Self {
        Self::with_config(ResolverConfig::default(), ResolverOpts::default(), timeout)
    }

    /// Resolver using the host's resolv.conf, falling back to the defaults.
    pub fn from_system(timeout: Duration) -> Self {
        match trust_dns_resolver::system_conf::read_system_conf() {
            Ok((config, opts)) => Self::with_config(config, opts, timeout),
            Err(e) => {
                debug!(error = %e, "system resolver config unavailable, using defaults");
                Self::new(timeout)
            }
        }
    }

    fn with_config(config: ResolverConfig, mut opts: ResolverOpts, timeout: Duration) -> Self {
        opts.timeout = timeout;
        opts.attempts = 1;
        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            timeout,
        }
    }

    async fn lookup_ip(&self, domain: &str) -> Lookup {
        match self.resolver.lookup_ip(domain).await {
            Ok(response) => {
                if response.iter().next().is_some() {
                    Lookup::Found
                } else {
                    Lookup::NotFound
                }
            }
            Err(err) => match err.kind() {
                ResolveErrorKind::NoRecordsFound { response_code, .. }
                    if matches!(*response_code, ResponseCode::NXDomain | ResponseCode::NoError) =>
                {
                    Lookup::NotFound
                }
                ResolveErrorKind::Timeout => Lookup::Failed(SweepError::timeout(
                    format!("DNS lookup for {}", domain),
                    self.timeout,
                )),
                _ => Lookup::Failed(SweepError::resolution(domain, err.to_string())),
            },
        }
    }
}

impl Resolver for DnsResolver {
    fn lookup<'a>(&'a self, domain: &'a str) -> BoxFuture<'a, Lookup> {
        Box::pin(self.lookup_ip(domain))
    }
}
