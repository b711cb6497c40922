use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::PackError;
use crate::service::ContentMethod;
use crate::store::{record_id, record_slug, Record};
use crate::tenant::TenantId;

/// Kinds of confirmed mutation that produce a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Create,
    Update,
    Delete,
    Publish,
    Unpublish,
}

impl ChangeAction {
    pub const ALL: [ChangeAction; 5] = [
        ChangeAction::Create,
        ChangeAction::Update,
        ChangeAction::Delete,
        ChangeAction::Publish,
        ChangeAction::Unpublish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Create => "create",
            ChangeAction::Update => "update",
            ChangeAction::Delete => "delete",
            ChangeAction::Publish => "publish",
            ChangeAction::Unpublish => "unpublish",
        }
    }

    /// Event name advertised to receivers, e.g. `entry.create`.
    pub fn event_name(&self) -> String {
        format!("entry.{}", self.as_str())
    }

    /// Only mutations emit; PUT and PATCH both report `update`.
    pub fn from_method(method: &ContentMethod) -> Option<Self> {
        match method {
            ContentMethod::Create => Some(ChangeAction::Create),
            ContentMethod::Update | ContentMethod::Patch => Some(ChangeAction::Update),
            ContentMethod::Remove => Some(ChangeAction::Delete),
            ContentMethod::Publish => Some(ChangeAction::Publish),
            ContentMethod::Unpublish => Some(ChangeAction::Unpublish),
            ContentMethod::Find | ContentMethod::Get => None,
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeAction {
    type Err = PackError;

    /// Accepts both `create` and `entry.create`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_lowercase();
        let norm = norm.strip_prefix("entry.").unwrap_or(&norm);
        ChangeAction::ALL
            .into_iter()
            .find(|a| a.as_str() == norm)
            .ok_or_else(|| PackError::bad_request(format!("Unknown change action: {s}")))
    }
}

/// Where an event originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerSource {
    /// Emitted by a controller after a successful mutation.
    LifecycleHook,
    /// Requested through `POST /webhooks/trigger-build`.
    #[serde(rename = "strapi-webhook")]
    ManualTrigger,
}

/// Normalized, tenant-scoped change notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub tenant_id: TenantId,
    pub content_type: String,
    pub action: ChangeAction,
    pub entry_id: Option<String>,
    pub entry_slug: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub trigger_source: TriggerSource,
}

impl ChangeEvent {
    pub fn new(
        tenant_id: TenantId,
        content_type: impl Into<String>,
        action: ChangeAction,
        entry: Option<&Record>,
        trigger_source: TriggerSource,
    ) -> Self {
        Self {
            tenant_id,
            content_type: content_type.into(),
            action,
            entry_id: entry.and_then(record_id),
            entry_slug: entry.and_then(record_slug),
            timestamp: Utc::now(),
            trigger_source,
        }
    }
}

/// Anything that accepts change events.
///
/// `publish` must return promptly: the controller calls it on the request
/// path and never looks at the outcome.
pub trait ChangeEventSink: Send + Sync {
    fn publish(&self, event: ChangeEvent);
}

/// Fan-out to every registered sink.
#[derive(Default, Clone)]
pub struct EventHub {
    sinks: Vec<Arc<dyn ChangeEventSink>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sink: Arc<dyn ChangeEventSink>) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn publish(&self, event: ChangeEvent) {
        match self.sinks.split_last() {
            None => {
                tracing::debug!(
                    tenant = %event.tenant_id,
                    action = %event.action,
                    "no change event sinks registered, dropping event"
                );
            }
            Some((last, rest)) => {
                for sink in rest {
                    sink.publish(event.clone());
                }
                last.publish(event);
            }
        }
    }
}
