use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Result;

use crate::config::PackConfig;
use crate::controller::{ContentTypeOptions, TenantScopedController};
use crate::errors::PackError;
use crate::events::{ChangeEventSink, EventHub};
use crate::hooks::{MethodHooks, ServiceHooks};
use crate::registry::ContentRegistry;
use crate::service::ContentMethod;
use crate::store::ContentStore;

// A panicking hook must not wedge every later request behind a poisoned lock.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// State shared between the app and every controller it created.
#[derive(Default)]
pub(crate) struct AppShared {
    global_hooks: RwLock<ServiceHooks>,
    content_hooks: RwLock<HashMap<String, ServiceHooks>>,
    config: RwLock<PackConfig>,
    events: RwLock<EventHub>,
}

impl AppShared {
    /// App-wide hooks first, then content-type hooks.
    pub(crate) fn hooks_for(&self, content_type: &str, method: &ContentMethod) -> MethodHooks {
        let mut hooks = read(&self.global_hooks).for_method(method);
        if let Some(local) = read(&self.content_hooks).get(content_type) {
            hooks.extend(local.for_method(method));
        }
        hooks
    }

    pub(crate) fn events(&self) -> EventHub {
        read(&self.events).clone()
    }
}

struct PackAppInner {
    registry: RwLock<ContentRegistry>,
    shared: Arc<AppShared>,
}

/// Application container: content-type registry, hooks, config and the
/// change-event hub.
///
/// Framework-agnostic; `pack-axum` mounts it over HTTP.
#[derive(Clone)]
pub struct PackApp {
    inner: Arc<PackAppInner>,
}

impl Default for PackApp {
    fn default() -> Self {
        Self::new()
    }
}

impl PackApp {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(PackAppInner {
                registry: RwLock::new(ContentRegistry::new()),
                shared: Arc::new(AppShared::default()),
            }),
        }
    }

    /// Register a content type with the default (publishable) capabilities.
    pub fn register_content_type(
        &self,
        name: impl Into<String>,
        store: Arc<dyn ContentStore>,
    ) -> Arc<TenantScopedController> {
        self.register_content_type_with(name, store, ContentTypeOptions::default())
    }

    pub fn register_content_type_with(
        &self,
        name: impl Into<String>,
        store: Arc<dyn ContentStore>,
        options: ContentTypeOptions,
    ) -> Arc<TenantScopedController> {
        let name = name.into();
        let controller = Arc::new(TenantScopedController::new(
            name.clone(),
            store,
            options,
            Arc::clone(&self.inner.shared),
        ));
        write(&self.inner.registry).register(Arc::clone(&controller));
        tracing::debug!(content_type = %name, "registered content type");
        controller
    }

    /// Controller for `name`, or `NotFound`.
    pub fn content(&self, name: &str) -> Result<Arc<TenantScopedController>> {
        read(&self.inner.registry)
            .get(name)
            .cloned()
            .ok_or_else(|| PackError::not_found(format!("Unknown content type: {name}")).into_anyhow())
    }

    pub fn content_types(&self) -> Vec<String> {
        read(&self.inner.registry).names()
    }

    /// App-wide hooks, applied to every content type.
    pub fn hooks<F>(&self, f: F)
    where
        F: FnOnce(&mut ServiceHooks),
    {
        f(&mut write(&self.inner.shared.global_hooks));
    }

    /// Hooks for a single registered content type.
    pub fn content_hooks<F>(&self, name: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut ServiceHooks),
    {
        if !read(&self.inner.registry).contains(name) {
            return Err(PackError::not_found(format!("Unknown content type: {name}")).into_anyhow());
        }
        let mut map = write(&self.inner.shared.content_hooks);
        f(map.entry(name.to_string()).or_default());
        Ok(())
    }

    /// Route change events from every controller into `sink`.
    pub fn on_change(&self, sink: Arc<dyn ChangeEventSink>) {
        write(&self.inner.shared.events).add(sink);
    }

    pub fn events(&self) -> EventHub {
        self.inner.shared.events()
    }

    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        write(&self.inner.shared.config).set(key, value);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        read(&self.inner.shared.config).get(key).map(str::to_string)
    }
}
