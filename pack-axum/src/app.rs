use axum::Router;
use pack_auth::TenantResolver;
use pack_core::PackApp;
use pack_webhooks::ChangeEventDispatcher;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::{rest, webhooks, PackAxumState};

/// HTTP front for a [`PackApp`].
///
/// Content routes live under `/api`, webhook routes under `/webhooks` once
/// [`AxumApp::with_webhooks`] was called.
#[derive(Clone)]
pub struct AxumApp {
    state: PackAxumState,
    extra: Router<()>,
}

impl AxumApp {
    pub fn new(app: PackApp, resolver: TenantResolver) -> Self {
        Self {
            state: PackAxumState::new(app, resolver),
            extra: Router::new(),
        }
    }

    pub fn app(&self) -> &PackApp {
        &self.state.app
    }

    /// Mount the webhook routes. Does not subscribe the dispatcher to
    /// controller events; use [`PackApp::on_change`] for that.
    pub fn with_webhooks(mut self, dispatcher: ChangeEventDispatcher) -> Self {
        self.state.webhooks = Some(dispatcher);
        self
    }

    /// Nest an extra stateless router, e.g. health checks.
    pub fn use_router(mut self, path: &str, router: Router<()>) -> Self {
        self.extra = self.extra.nest(path, router);
        self
    }

    pub fn into_router(self) -> Router {
        let mut router = Router::new().nest("/api", rest::content_router());
        if self.state.webhooks.is_some() {
            router = router.nest("/webhooks", webhooks::webhook_router());
        }

        router
            .with_state(self.state)
            .merge(self.extra)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "listening");
        axum::serve(listener, self.into_router()).await?;
        Ok(())
    }
}
