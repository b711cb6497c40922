//! pack-core: framework-agnostic tenant-scoping layer for Pack.
//!
//! Tenant context, access policy, tenant-scoped controllers, hooks and
//! change events. Transports and credential handling live in sibling crates.

pub mod app;
pub mod config;
pub mod controller;
pub mod errors;
pub mod events;
pub mod hooks;
#[cfg(feature = "memory")]
pub mod memory;
pub mod policy;
pub mod registry;
pub mod service;
pub mod store;
pub mod tenant;

pub use app::PackApp;
pub use config::PackConfig;
pub use controller::{ContentTypeOptions, TenantScopedController};
pub use errors::{ErrorKind, PackError, PackResult};
pub use events::{ChangeAction, ChangeEvent, ChangeEventSink, EventHub, TriggerSource};
pub use hooks::{AfterHook, BeforeHook, ErrorHook, HookContext, HookResult, MethodHooks, ServiceHooks};
#[cfg(feature = "memory")]
pub use memory::MemoryStore;
pub use policy::{evaluate, PolicyOutcome};
pub use registry::ContentRegistry;
pub use service::{ContentMethod, ServiceCapabilities};
pub use store::{ContentStore, Filters, Record, PUBLISHED_AT_FIELD, TENANT_FIELD};
pub use tenant::{TenantContext, TenantId};
