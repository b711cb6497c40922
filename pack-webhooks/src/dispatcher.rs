//! Change event dispatcher.
//!
//! One best-effort `POST` per event to the tenant's endpoint. No retries, no
//! queue, no persistence; failures are logged and never reach the caller
//! that caused the change.

use std::sync::Arc;
use std::time::Duration;

use pack_core::{ChangeEvent, ChangeEventSink};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::DispatchError;
use crate::registry::WebhookRegistry;

/// Whether `supported_events` / `content_types` gate delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventFilterMode {
    /// Listed for introspection only; every event is sent.
    #[default]
    Advisory,
    /// Events outside the tenant's lists are filtered out.
    Enforce,
}

impl std::str::FromStr for EventFilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "advisory" => Ok(Self::Advisory),
            "enforce" => Ok(Self::Enforce),
            other => Err(format!("unknown webhook filter mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherOptions {
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub filter_mode: EventFilterMode,
    pub user_agent: String,
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            filter_mode: EventFilterMode::Advisory,
            user_agent: concat!("pack-webhooks/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered { status: u16 },
    /// No endpoint for the tenant.
    Dropped,
    /// Rejected by [`EventFilterMode::Enforce`].
    Filtered,
    Failed { reason: String },
}

#[derive(Clone)]
pub struct ChangeEventDispatcher {
    registry: Arc<WebhookRegistry>,
    client: reqwest::Client,
    options: DispatcherOptions,
}

impl ChangeEventDispatcher {
    pub fn new(registry: Arc<WebhookRegistry>, options: DispatcherOptions) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.clone())
            .build()
            .map_err(DispatchError::Client)?;

        Ok(Self {
            registry,
            client,
            options,
        })
    }

    pub fn registry(&self) -> &WebhookRegistry {
        &self.registry
    }

    pub fn options(&self) -> &DispatcherOptions {
        &self.options
    }

    /// Resolve and send one event. Never returns an error; the outcome says
    /// what happened.
    pub async fn deliver(&self, event: &ChangeEvent) -> DispatchOutcome {
        let Some(endpoint) = self.registry.resolve(&event.tenant_id) else {
            tracing::info!(
                tenant = %event.tenant_id,
                action = %event.action,
                "no webhook endpoint configured, dropping event"
            );
            return DispatchOutcome::Dropped;
        };

        if self.options.filter_mode == EventFilterMode::Enforce
            && !(endpoint.supports_action(&event.action)
                && endpoint.supports_content_type(&event.content_type))
        {
            tracing::debug!(
                tenant = %event.tenant_id,
                action = %event.action,
                content_type = %event.content_type,
                "event not accepted by tenant webhook"
            );
            return DispatchOutcome::Filtered;
        }

        match self.post(&endpoint.webhook_url, event).await {
            Ok(status) => {
                tracing::info!(
                    tenant = %event.tenant_id,
                    action = %event.action,
                    status,
                    "webhook delivered"
                );
                DispatchOutcome::Delivered { status }
            }
            Err(e) => {
                tracing::warn!(
                    tenant = %event.tenant_id,
                    action = %event.action,
                    url = %endpoint.webhook_url,
                    error = %e,
                    "webhook delivery failed"
                );
                DispatchOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn post(&self, url: &str, event: &ChangeEvent) -> Result<u16, DispatchError> {
        let response = self
            .client
            .post(url)
            .header("x-pack-event", event.action.event_name())
            .header("x-pack-tenant", event.tenant_id.as_str())
            .json(event)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Status(status.as_u16()));
        }
        Ok(status.as_u16())
    }

    /// Spawn delivery on the current runtime and return at once.
    ///
    /// `None` when called outside a tokio runtime; the event is dropped.
    pub fn dispatch(&self, event: ChangeEvent) -> Option<JoinHandle<DispatchOutcome>> {
        let handle = match Handle::try_current() {
            Ok(h) => h,
            Err(_) => {
                tracing::error!(
                    tenant = %event.tenant_id,
                    action = %event.action,
                    "no tokio runtime available, change event dropped"
                );
                return None;
            }
        };

        let dispatcher = self.clone();
        Some(handle.spawn(async move { dispatcher.deliver(&event).await }))
    }
}

impl ChangeEventSink for ChangeEventDispatcher {
    fn publish(&self, event: ChangeEvent) {
        let _ = self.dispatch(event);
    }
}
