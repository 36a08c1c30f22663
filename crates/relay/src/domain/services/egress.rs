//! Egress Policy
//!
//! Decides which upstream endpoints the proxy may contact. Only literal
//! hosts are inspected; names are not resolved.

use std::net::{Ipv4Addr, Ipv6Addr};

use url::{Host, Url};

use crate::domain::errors::DomainError;

#[derive(Debug, Clone, Default)]
pub struct EgressPolicy {
    /// Permit loopback, private and link-local targets
    pub allow_private_targets: bool,
    /// When non-empty, hosts must match an entry or be a subdomain of one
    pub allowed_hosts: Vec<String>,
}

impl EgressPolicy {
    /// Policy that only validates the URL shape
    pub fn permissive() -> Self {
        Self {
            allow_private_targets: true,
            allowed_hosts: Vec::new(),
        }
    }

    pub fn with_allowed_hosts(mut self, hosts: Vec<String>) -> Self {
        self.allowed_hosts = hosts
            .into_iter()
            .map(|h| h.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        self
    }

    /// Check an endpoint, returning the reason when it is refused
    pub fn check(&self, endpoint: &str) -> Result<Url, String> {
        let url = parse_endpoint(endpoint).map_err(|e| e.to_string())?;
        let host = url
            .host()
            .ok_or_else(|| "endpoint has no host".to_string())?;

        if !self.allow_private_targets && is_internal_host(&host) {
            tracing::debug!(host = %host, "Refusing internal upstream target");
            return Err(format!("{} is an internal address", host));
        }

        if !self.allowed_hosts.is_empty() {
            let name = host.to_string().to_ascii_lowercase();
            let listed = self
                .allowed_hosts
                .iter()
                .any(|allowed| name == *allowed || name.ends_with(&format!(".{}", allowed)));
            if !listed {
                tracing::debug!(host = %name, "Refusing unlisted upstream host");
                return Err(format!("{} is not in the allowed host list", name));
            }
        }

        Ok(url)
    }
}

/// Validate that an endpoint is an absolute http(s) URL
pub fn parse_endpoint(endpoint: &str) -> Result<Url, DomainError> {
    let trimmed = endpoint.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation("endpoint is required".to_string()));
    }

    let url = Url::parse(trimmed)
        .map_err(|e| DomainError::Validation(format!("Invalid endpoint URL: {}", e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(DomainError::Validation(format!(
                "Unsupported endpoint scheme: {}",
                other
            )))
        }
    }

    if url.host().is_none() {
        return Err(DomainError::Validation(
            "Invalid endpoint URL: missing host".to_string(),
        ));
    }

    Ok(url)
}

fn is_internal_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(name) => {
            let name = name.trim_end_matches('.').to_ascii_lowercase();
            name == "localhost" || name.ends_with(".localhost")
        }
        Host::Ipv4(ip) => is_internal_v4(ip),
        Host::Ipv6(ip) => is_internal_v6(ip),
    }
}

fn is_internal_v4(ip: &Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        // 100.64.0.0/10 shared address space
        || (a == 100 && (64..128).contains(&b))
}

fn is_internal_v6(ip: &Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_internal_v4(&v4);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        // fc00::/7 unique local
        || (first & 0xfe00) == 0xfc00
        // fe80::/10 link local
        || (first & 0xffc0) == 0xfe80
}
