use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::service::ContentMethod;
use crate::store::{Filters, Record};
use crate::tenant::TenantContext;

/// Output of a controller call.
#[derive(Debug, Clone, PartialEq)]
pub enum HookResult {
    One(Record),
    Many(Vec<Record>),
}

/// Context passed to hooks.
///
/// Only built once a call has passed the capability, tenant and ownership
/// checks. Who is calling, which method and which record are fixed at that
/// point: hooks read them through getters and may only reshape `filters`,
/// `data` and `result`.
#[derive(Debug)]
pub struct HookContext {
    pub(crate) tenant: TenantContext,
    pub(crate) content_type: String,
    pub(crate) method: ContentMethod,
    pub(crate) id: Option<String>,
    pub(crate) existing: Option<Record>,
    pub filters: Filters,
    pub data: Option<Record>,
    pub result: Option<HookResult>,
    pub error: Option<anyhow::Error>,
}

impl HookContext {
    pub(crate) fn new(
        tenant: TenantContext,
        content_type: impl Into<String>,
        method: ContentMethod,
    ) -> Self {
        Self {
            tenant,
            content_type: content_type.into(),
            method,
            id: None,
            existing: None,
            filters: Filters::new(),
            data: None,
            result: None,
            error: None,
        }
    }

    pub fn tenant(&self) -> &TenantContext {
        &self.tenant
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn method(&self) -> ContentMethod {
        self.method
    }

    /// Target of an id-addressed call.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The owned record as it was before this call, for id-addressed methods.
    pub fn existing(&self) -> Option<&Record> {
        self.existing.as_ref()
    }
}

/// Runs before storage, after tenant checks. May reshape `filters` / `data`;
/// the access policy still has the last word on `tenant_id`.
#[async_trait]
pub trait BeforeHook: Send + Sync {
    async fn run(&self, ctx: &mut HookContext) -> Result<()>;
}

/// Runs after a successful storage call. May reshape `result`.
#[async_trait]
pub trait AfterHook: Send + Sync {
    async fn run(&self, ctx: &mut HookContext) -> Result<()>;
}

/// Observes a failed call; `ctx.error` is set. Cannot recover the call.
#[async_trait]
pub trait ErrorHook: Send + Sync {
    async fn run(&self, ctx: &mut HookContext) -> Result<()>;
}

/// Hooks registered either app-wide or for one content type.
#[derive(Default, Clone)]
pub struct ServiceHooks {
    pub before_all: Vec<Arc<dyn BeforeHook>>,
    pub before_by_method: HashMap<ContentMethod, Vec<Arc<dyn BeforeHook>>>,
    pub after_all: Vec<Arc<dyn AfterHook>>,
    pub after_by_method: HashMap<ContentMethod, Vec<Arc<dyn AfterHook>>>,
    pub error_all: Vec<Arc<dyn ErrorHook>>,
    pub error_by_method: HashMap<ContentMethod, Vec<Arc<dyn ErrorHook>>>,
}

/// Hooks resolved for one call, in execution order.
#[derive(Default, Clone)]
pub struct MethodHooks {
    pub before: Vec<Arc<dyn BeforeHook>>,
    pub after: Vec<Arc<dyn AfterHook>>,
    pub error: Vec<Arc<dyn ErrorHook>>,
}

impl MethodHooks {
    pub fn extend(&mut self, other: MethodHooks) {
        self.before.extend(other.before);
        self.after.extend(other.after);
        self.error.extend(other.error);
    }
}

fn collect<H: ?Sized>(
    all: &[Arc<H>],
    by_method: &HashMap<ContentMethod, Vec<Arc<H>>>,
    method: &ContentMethod,
) -> Vec<Arc<H>> {
    let mut out: Vec<Arc<H>> = all.to_vec();
    if let Some(hooks) = by_method.get(method) {
        out.extend(hooks.iter().cloned());
    }
    out
}

impl ServiceHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before_all(&mut self, hook: Arc<dyn BeforeHook>) -> &mut Self {
        self.before_all.push(hook);
        self
    }

    pub fn before(&mut self, method: ContentMethod, hook: Arc<dyn BeforeHook>) -> &mut Self {
        self.before_by_method.entry(method).or_default().push(hook);
        self
    }

    pub fn after_all(&mut self, hook: Arc<dyn AfterHook>) -> &mut Self {
        self.after_all.push(hook);
        self
    }

    pub fn after(&mut self, method: ContentMethod, hook: Arc<dyn AfterHook>) -> &mut Self {
        self.after_by_method.entry(method).or_default().push(hook);
        self
    }

    pub fn error_all(&mut self, hook: Arc<dyn ErrorHook>) -> &mut Self {
        self.error_all.push(hook);
        self
    }

    pub fn error(&mut self, method: ContentMethod, hook: Arc<dyn ErrorHook>) -> &mut Self {
        self.error_by_method.entry(method).or_default().push(hook);
        self
    }

    pub fn before_create(&mut self, hook: Arc<dyn BeforeHook>) -> &mut Self {
        self.before(ContentMethod::Create, hook)
    }

    pub fn after_find(&mut self, hook: Arc<dyn AfterHook>) -> &mut Self {
        self.after(ContentMethod::Find, hook)
    }

    /// `*_all` hooks first, then method-specific ones.
    pub fn for_method(&self, method: &ContentMethod) -> MethodHooks {
        MethodHooks {
            before: collect(&self.before_all, &self.before_by_method, method),
            after: collect(&self.after_all, &self.after_by_method, method),
            error: collect(&self.error_all, &self.error_by_method, method),
        }
    }
}
