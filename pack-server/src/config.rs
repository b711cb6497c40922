use std::collections::HashMap;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use pack_core::TenantId;
use pack_webhooks::EventFilterMode;

/// Server settings, read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub jwt_secret: Option<String>,
    pub jwt_leeway_seconds: u64,
    pub content_types: Vec<String>,
    pub tenants: Vec<TenantId>,
    /// Endpoints set in code. `<TENANT>_WEBHOOK_URL` variables are read by
    /// the registry itself; these win over them.
    pub webhook_urls: HashMap<TenantId, String>,
    pub webhook_fallback: Option<String>,
    pub webhook_timeout: Duration,
    pub webhook_filter: EventFilterMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 1337,
            jwt_secret: None,
            jwt_leeway_seconds: 0,
            content_types: vec!["articles".to_string(), "pages".to_string()],
            tenants: ["tenant-a", "tenant-b", "tenant-c"]
                .into_iter()
                .filter_map(|t| TenantId::new(t).ok())
                .collect(),
            webhook_urls: HashMap::new(),
            webhook_fallback: None,
            webhook_timeout: Duration::from_secs(10),
            webhook_filter: EventFilterMode::Advisory,
        }
    }
}

fn list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut s = Settings::default();

        if let Some(host) = lookup("HTTP_HOST") {
            s.host = host;
        }
        if let Some(port) = lookup("HTTP_PORT") {
            s.port = port
                .trim()
                .parse()
                .with_context(|| format!("HTTP_PORT is not a port number: {port}"))?;
        }

        s.jwt_secret = lookup("AUTH_JWT_SECRET").filter(|v| !v.trim().is_empty());
        if let Some(leeway) = lookup("AUTH_JWT_LEEWAY") {
            s.jwt_leeway_seconds = leeway
                .trim()
                .parse()
                .with_context(|| format!("AUTH_JWT_LEEWAY must be whole seconds: {leeway}"))?;
        }

        if let Some(types) = lookup("PACK_CONTENT_TYPES") {
            s.content_types = list(&types);
        }
        if let Some(tenants) = lookup("PACK_TENANTS") {
            s.tenants = list(&tenants)
                .into_iter()
                .map(TenantId::new)
                .collect::<Result<_, _>>()
                .map_err(|e| anyhow!("PACK_TENANTS: {e}"))?;
        }

        s.webhook_fallback = lookup("PACK_WEBHOOK_FALLBACK");
        if let Some(timeout) = lookup("PACK_WEBHOOK_TIMEOUT") {
            s.webhook_timeout = humantime::parse_duration(timeout.trim())
                .with_context(|| format!("PACK_WEBHOOK_TIMEOUT is not a duration: {timeout}"))?;
        }
        if let Some(mode) = lookup("PACK_WEBHOOK_FILTER") {
            s.webhook_filter = mode.parse().map_err(|e: String| anyhow!(e))?;
        }

        Ok(s)
    }
}
