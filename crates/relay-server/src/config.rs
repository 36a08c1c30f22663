//! Server configuration
//!
//! Read once at startup from Shuttle secrets, falling back to the process
//! environment (optionally populated from a local `.env`).

use relay::{EgressPolicy, UpstreamConfig};

pub const API_KEYS: &str = "RELAY_API_KEYS";
pub const ALLOW_PRIVATE_TARGETS: &str = "RELAY_ALLOW_PRIVATE_TARGETS";
pub const ALLOWED_HOSTS: &str = "RELAY_ALLOWED_HOSTS";
pub const USER_AGENT: &str = "RELAY_USER_AGENT";

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Keys accepted on the execute route; empty disables the check
    pub api_keys: Vec<String>,
    pub egress: EgressPolicy,
    pub upstream: UpstreamConfig,
}

impl AppConfig {
    pub fn from_secrets(secrets: &shuttle_runtime::SecretStore) -> Self {
        if dotenvy::dotenv().is_ok() {
            tracing::info!("Loaded local .env");
        }
        Self::from_lookup(|key| secrets.get(key).or_else(|| std::env::var(key).ok()))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_keys = lookup(API_KEYS)
            .map(|raw| split_list(&raw))
            .unwrap_or_default();

        let allow_private_targets = lookup(ALLOW_PRIVATE_TARGETS)
            .map(|raw| parse_flag(&raw))
            .unwrap_or(false);

        let allowed_hosts = lookup(ALLOWED_HOSTS)
            .map(|raw| split_list(&raw))
            .unwrap_or_default();

        let mut upstream = UpstreamConfig::default();
        if let Some(agent) = lookup(USER_AGENT).filter(|a| !a.trim().is_empty()) {
            upstream.user_agent = agent;
        }

        Self {
            api_keys,
            egress: EgressPolicy {
                allow_private_targets,
                ..Default::default()
            }
            .with_allowed_hosts(allowed_hosts),
            upstream,
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
