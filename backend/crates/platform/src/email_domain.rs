//! Mail Domain Reputation Checks
//!
//! DNS-visible deliverability signals for an email domain:
//! - MX: the domain can receive mail at all
//! - SPF: a `v=spf1` TXT record at the domain
//! - DMARC: a `v=DMARC1` TXT record at `_dmarc.<domain>`
//!
//! Lookups are bounded by the resolver timeout; a failed or timed-out
//! lookup means "signal absent", never an error. Pure function of DNS
//! state, no caching.

use std::time::Duration;

use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};

/// Default per-lookup timeout
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(3);

/// Deliverability signals observed for a domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainReputation {
    pub domain: String,
    pub has_mx: bool,
    pub has_spf: bool,
    pub has_dmarc: bool,
}

impl DomainReputation {
    /// All three signals present
    pub fn is_deliverable(&self) -> bool {
        self.has_mx && self.has_spf && self.has_dmarc
    }

    /// Names of the absent signals, for error reporting
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.has_mx {
            missing.push("MX");
        }
        if !self.has_spf {
            missing.push("SPF");
        }
        if !self.has_dmarc {
            missing.push("DMARC");
        }
        missing
    }
}

/// Domain reputation lookup seam
///
/// Implemented over real DNS below; tests substitute a static checker.
#[trait_variant::make(DomainChecker: Send)]
pub trait LocalDomainChecker {
    /// Observe the deliverability signals for `domain`
    async fn check(&self, domain: &str) -> DomainReputation;
}

/// DNS-backed domain checker
#[derive(Clone)]
pub struct DnsDomainChecker {
    resolver: TokioAsyncResolver,
}

impl DnsDomainChecker {
    /// Create a checker with the given per-lookup timeout
    ///
    /// Uses the default resolver configuration (public resolvers); one
    /// attempt per lookup so a dead resolver costs at most one timeout.
    pub fn new(timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 1;
        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), opts),
        }
    }

    async fn has_mx_records(&self, domain: &str) -> bool {
        match self.resolver.mx_lookup(domain).await {
            Ok(lookup) => lookup.iter().next().is_some(),
            Err(_) => false,
        }
    }

    async fn has_txt_record_with_prefix(&self, name: &str, prefix: &str) -> bool {
        let lookup = match self.resolver.txt_lookup(name).await {
            Ok(lookup) => lookup,
            Err(_) => return false,
        };

        lookup.iter().any(|txt| {
            let joined: String = txt
                .txt_data()
                .iter()
                .map(|chunk| String::from_utf8_lossy(chunk))
                .collect();
            joined.starts_with(prefix)
        })
    }
}

impl Default for DnsDomainChecker {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_TIMEOUT)
    }
}

impl DomainChecker for DnsDomainChecker {
    async fn check(&self, domain: &str) -> DomainReputation {
        let has_mx = self.has_mx_records(domain).await;
        let has_spf = self.has_txt_record_with_prefix(domain, "v=spf1").await;
        let has_dmarc = self
            .has_txt_record_with_prefix(&format!("_dmarc.{}", domain), "v=DMARC1")
            .await;

        DomainReputation {
            domain: domain.to_string(),
            has_mx,
            has_spf,
            has_dmarc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_lists_absent_signals() {
        let rep = DomainReputation {
            domain: "example.com".to_string(),
            has_mx: true,
            has_spf: false,
            has_dmarc: false,
        };
        assert_eq!(rep.missing(), vec!["SPF", "DMARC"]);
        assert!(!rep.is_deliverable());
    }

    #[test]
    fn test_all_signals_present() {
        let rep = DomainReputation {
            domain: "example.com".to_string(),
            has_mx: true,
            has_spf: true,
            has_dmarc: true,
        };
        assert!(rep.missing().is_empty());
        assert!(rep.is_deliverable());
    }
}
