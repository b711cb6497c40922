pub mod config;
mod hooks;

use std::sync::Arc;

use anyhow::Result;
use pack_auth::{AuthOptions, JwtOptions, TenantResolver};
use pack_axum::AxumApp;
use pack_core::{MemoryStore, PackApp};
use pack_webhooks::{ChangeEventDispatcher, DispatcherOptions, WebhookRegistry};

pub use config::Settings;

/// Wire the content API: in-memory storage for every configured content
/// type, credential resolution, logging hooks and webhook dispatch.
pub fn build(settings: Settings) -> Result<AxumApp> {
    let app = PackApp::new();
    app.set("http.host", settings.host.clone());
    app.set("http.port", settings.port.to_string());

    hooks::global_hooks(&app);

    let store = Arc::new(MemoryStore::new());
    for content_type in &settings.content_types {
        app.register_content_type(content_type.as_str(), store.clone());
    }

    let mut jwt = JwtOptions {
        leeway_seconds: settings.jwt_leeway_seconds,
        ..JwtOptions::default()
    };
    if let Some(secret) = &settings.jwt_secret {
        jwt = jwt.with_secret(secret.clone());
    }
    let resolver = TenantResolver::from_options(AuthOptions::default().with_jwt(jwt));

    let registry = WebhookRegistry::from_env(
        settings.tenants.clone(),
        settings.webhook_fallback.clone(),
    )
    .with_endpoints(settings.webhook_urls.clone())
    .with_content_types(settings.content_types.clone());

    let dispatcher = ChangeEventDispatcher::new(
        Arc::new(registry),
        DispatcherOptions {
            timeout: settings.webhook_timeout,
            filter_mode: settings.webhook_filter,
            ..DispatcherOptions::default()
        },
    )?;
    app.on_change(Arc::new(dispatcher.clone()));

    let ax = AxumApp::new(app, resolver)
        .with_webhooks(dispatcher)
        .use_router("/health", axum::Router::new().route("/", axum::routing::get(|| async { "ok" })));

    Ok(ax)
}
