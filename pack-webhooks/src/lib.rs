//! pack-webhooks: per-tenant webhook endpoints and change event delivery.
//!
//! Delivery is best-effort and at most once per event. A durable outbox with
//! retries would sit behind the same [`pack_core::ChangeEventSink`] seam.

pub mod dispatcher;
pub mod error;
pub mod registry;

pub use dispatcher::{ChangeEventDispatcher, DispatchOutcome, DispatcherOptions, EventFilterMode};
pub use error::DispatchError;
pub use registry::{env_key, WebhookEndpointConfig, WebhookRegistry, DEFAULT_FALLBACK_TEMPLATE};
