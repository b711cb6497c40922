//! Tenant → webhook endpoint resolution.
//!
//! Endpoints are injected at construction; [`WebhookRegistry::from_env`] is
//! only one way to build the map. The registry is immutable afterwards and
//! shared behind an `Arc`.

use std::collections::{HashMap, HashSet};

use pack_core::{ChangeAction, TenantId};
use serde::Serialize;

pub const DEFAULT_FALLBACK_TEMPLATE: &str = "https://hooks.netlify.com/build_hooks/{tenant}-build-id";

/// What a tenant's webhook looks like, as reported by `GET /webhooks/config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookEndpointConfig {
    pub tenant_id: TenantId,
    pub webhook_url: String,
    pub supported_events: Vec<String>,
    pub content_types: Vec<String>,
}

impl WebhookEndpointConfig {
    pub fn supports_action(&self, action: &ChangeAction) -> bool {
        let name = action.event_name();
        self.supported_events.iter().any(|e| *e == name)
    }

    pub fn supports_content_type(&self, content_type: &str) -> bool {
        self.content_types.iter().any(|c| c == content_type)
    }
}

#[derive(Debug, Clone)]
pub struct WebhookRegistry {
    endpoints: HashMap<TenantId, String>,
    known: HashSet<TenantId>,
    fallback_template: String,
    supported_events: Vec<String>,
    content_types: Vec<String>,
}

/// `tenant-a` → `TENANT_A_WEBHOOK_URL`.
pub fn env_key(tenant: &TenantId) -> String {
    format!("{}_WEBHOOK_URL", tenant.as_str().to_uppercase().replace('-', "_"))
}

impl WebhookRegistry {
    pub fn new(endpoints: HashMap<TenantId, String>) -> Self {
        Self {
            endpoints,
            known: HashSet::new(),
            fallback_template: DEFAULT_FALLBACK_TEMPLATE.to_string(),
            supported_events: ChangeAction::ALL.iter().map(ChangeAction::event_name).collect(),
            content_types: Vec::new(),
        }
    }

    /// Tenants that get the fallback URL when they have no explicit entry.
    pub fn with_known_tenants(mut self, tenants: impl IntoIterator<Item = TenantId>) -> Self {
        self.known.extend(tenants);
        self
    }

    /// Explicit endpoints; they replace entries with the same tenant.
    pub fn with_endpoints(mut self, endpoints: HashMap<TenantId, String>) -> Self {
        self.endpoints.extend(endpoints);
        self
    }

    /// `{tenant}` is replaced with the tenant id.
    pub fn with_fallback_template(mut self, template: impl Into<String>) -> Self {
        self.fallback_template = template.into();
        self
    }

    pub fn with_content_types(mut self, content_types: Vec<String>) -> Self {
        self.content_types = content_types;
        self
    }

    /// Build from `<TENANT>_WEBHOOK_URL` variables for every known tenant.
    pub fn from_env(known_tenants: Vec<TenantId>, fallback_template: Option<String>) -> Self {
        Self::from_lookup(known_tenants, fallback_template, |key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(
        known_tenants: Vec<TenantId>,
        fallback_template: Option<String>,
        lookup: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoints = known_tenants
            .iter()
            .filter_map(|t| {
                let url = lookup(&env_key(t))?;
                let url = url.trim();
                (!url.is_empty()).then(|| (t.clone(), url.to_string()))
            })
            .collect();

        let registry = Self::new(endpoints).with_known_tenants(known_tenants);
        match fallback_template {
            Some(template) => registry.with_fallback_template(template),
            None => registry,
        }
    }

    fn fallback_url(&self, tenant: &TenantId) -> String {
        self.fallback_template.replace("{tenant}", tenant.as_str())
    }

    fn config(&self, tenant: &TenantId, webhook_url: String) -> WebhookEndpointConfig {
        WebhookEndpointConfig {
            tenant_id: tenant.clone(),
            webhook_url,
            supported_events: self.supported_events.clone(),
            content_types: self.content_types.clone(),
        }
    }

    /// Where events for `tenant` go: the explicit entry, else the fallback for
    /// known tenants, else nowhere.
    pub fn resolve(&self, tenant: &TenantId) -> Option<WebhookEndpointConfig> {
        if let Some(url) = self.endpoints.get(tenant) {
            return Some(self.config(tenant, url.clone()));
        }
        self.known
            .contains(tenant)
            .then(|| self.config(tenant, self.fallback_url(tenant)))
    }

    /// Configuration shown to a tenant, fallback included for any tenant.
    pub fn describe(&self, tenant: &TenantId) -> WebhookEndpointConfig {
        let url = self
            .endpoints
            .get(tenant)
            .cloned()
            .unwrap_or_else(|| self.fallback_url(tenant));
        self.config(tenant, url)
    }
}
