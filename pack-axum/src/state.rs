use std::sync::Arc;

use axum::http::HeaderMap;
use pack_auth::TenantResolver;
use pack_core::{PackApp, TenantContext};
use pack_webhooks::ChangeEventDispatcher;

#[derive(Clone)]
pub struct PackAxumState {
    pub app: PackApp,
    pub resolver: Arc<TenantResolver>,
    pub webhooks: Option<ChangeEventDispatcher>,
}

impl PackAxumState {
    pub fn new(app: PackApp, resolver: TenantResolver) -> Self {
        Self {
            app,
            resolver: Arc::new(resolver),
            webhooks: None,
        }
    }

    /// Tenant context for this request, if the credential holds up.
    pub fn tenant(&self, headers: &HeaderMap) -> Option<TenantContext> {
        self.resolver.resolve(headers)
    }
}
