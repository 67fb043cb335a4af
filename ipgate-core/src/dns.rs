use std::net::IpAddr;

use async_trait::async_trait;
use tracing::debug;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Reverse-DNS boundary for hostname-pattern rules. A missing PTR record is
/// the common case and simply yields `None`.
#[async_trait]
pub trait HostnameResolver: Send + Sync {
    async fn reverse(&self, address: IpAddr) -> Option<String>;
}

pub struct DnsHostnameResolver {
    resolver: TokioAsyncResolver,
}

impl DnsHostnameResolver {
    pub fn new() -> Self {
        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default()),
        }
    }
}

impl Default for DnsHostnameResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostnameResolver for DnsHostnameResolver {
    async fn reverse(&self, address: IpAddr) -> Option<String> {
        match self.resolver.reverse_lookup(address).await {
            Ok(response) => response
                .iter()
                .next()
                .map(|name| name.to_string().trim_end_matches('.').to_owned()),
            Err(error) => {
                debug!(%address, %error, "Reverse lookup yielded no hostname");
                None
            }
        }
    }
}

/// Used when hostname resolution is disabled; the hostname check then
/// treats every caller as having no known hostname.
pub struct NoHostnameResolver;

#[async_trait]
impl HostnameResolver for NoHostnameResolver {
    async fn reverse(&self, _address: IpAddr) -> Option<String> {
        None
    }
}
