//! Tenant-scoped resource controller.
//!
//! One generic controller per content type, parameterized by the content-type
//! identifier and a [`ContentStore`]. Every call walks the same states:
//!
//! 1. capability check (`MethodNotAllowed`)
//! 2. tenant context required (`NotAuthenticated`)
//! 3. id-addressed methods: unfiltered `find_one`, then `NotFound` or
//!    `Forbidden` before anything is mutated
//! 4. before hooks, access policy, storage, after hooks
//! 5. one change event per successful mutation

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use serde_json::{json, Value};

use crate::app::AppShared;
use crate::bail_pack;
use crate::errors::PackError;
use crate::events::{ChangeAction, ChangeEvent, TriggerSource};
use crate::hooks::{HookContext, HookResult, MethodHooks};
use crate::policy;
use crate::service::{ContentMethod, ServiceCapabilities};
use crate::store::{record_tenant, ContentStore, Filters, Record, PUBLISHED_AT_FIELD};
use crate::tenant::TenantContext;

/// Registration options for a content type.
#[derive(Debug, Clone, Default)]
pub struct ContentTypeOptions {
    /// Singular name used in messages ("Article not found").
    pub label: Option<String>,
    pub capabilities: ServiceCapabilities,
}

impl ContentTypeOptions {
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_capabilities(mut self, capabilities: ServiceCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }
}

/// Record that passed the ownership check for this call.
struct Target {
    id: String,
    record: Record,
}

pub struct TenantScopedController {
    content_type: String,
    label: String,
    store: Arc<dyn ContentStore>,
    capabilities: ServiceCapabilities,
    shared: Arc<AppShared>,
}

/// "articles" -> "Article"
fn label_for(content_type: &str) -> String {
    let singular = match content_type.strip_suffix('s') {
        Some(s) if !s.is_empty() => s,
        _ => content_type,
    };
    let mut chars = singular.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Record".to_string(),
    }
}

impl TenantScopedController {
    pub(crate) fn new(
        content_type: String,
        store: Arc<dyn ContentStore>,
        options: ContentTypeOptions,
        shared: Arc<AppShared>,
    ) -> Self {
        let label = options
            .label
            .unwrap_or_else(|| label_for(&content_type));
        Self {
            content_type,
            label,
            store,
            capabilities: options.capabilities,
            shared,
        }
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn capabilities(&self) -> &ServiceCapabilities {
        &self.capabilities
    }

    pub async fn find(&self, tenant: Option<&TenantContext>, filters: Filters) -> Result<Vec<Record>> {
        let ctx = self
            .call(ContentMethod::Find, tenant, None, filters, None)
            .await?;

        match ctx.result {
            Some(HookResult::Many(v)) => Ok(v),
            Some(HookResult::One(_)) => Err(anyhow!(
                "find() produced HookResult::One unexpectedly"
            )),
            None => Ok(vec![]),
        }
    }

    pub async fn get(&self, tenant: Option<&TenantContext>, id: &str) -> Result<Record> {
        let ctx = self
            .call(ContentMethod::Get, tenant, Some(id), Filters::new(), None)
            .await?;
        Self::one(ctx)
    }

    pub async fn create(&self, tenant: Option<&TenantContext>, data: Record) -> Result<Record> {
        let ctx = self
            .call(ContentMethod::Create, tenant, None, Filters::new(), Some(data))
            .await?;
        Self::one(ctx)
    }

    pub async fn update(&self, tenant: Option<&TenantContext>, id: &str, data: Record) -> Result<Record> {
        let ctx = self
            .call(ContentMethod::Update, tenant, Some(id), Filters::new(), Some(data))
            .await?;
        Self::one(ctx)
    }

    pub async fn patch(&self, tenant: Option<&TenantContext>, id: &str, data: Record) -> Result<Record> {
        let ctx = self
            .call(ContentMethod::Patch, tenant, Some(id), Filters::new(), Some(data))
            .await?;
        Self::one(ctx)
    }

    pub async fn remove(&self, tenant: Option<&TenantContext>, id: &str) -> Result<Record> {
        let ctx = self
            .call(ContentMethod::Remove, tenant, Some(id), Filters::new(), None)
            .await?;
        Self::one(ctx)
    }

    pub async fn publish(&self, tenant: Option<&TenantContext>, id: &str) -> Result<Record> {
        let ctx = self
            .call(ContentMethod::Publish, tenant, Some(id), Filters::new(), None)
            .await?;
        Self::one(ctx)
    }

    pub async fn unpublish(&self, tenant: Option<&TenantContext>, id: &str) -> Result<Record> {
        let ctx = self
            .call(ContentMethod::Unpublish, tenant, Some(id), Filters::new(), None)
            .await?;
        Self::one(ctx)
    }

    fn one(ctx: HookContext) -> Result<Record> {
        match ctx.result {
            Some(HookResult::One(v)) => Ok(v),
            Some(HookResult::Many(_)) => Err(anyhow!(
                "{}() produced HookResult::Many unexpectedly",
                ctx.method
            )),
            None => Err(anyhow!("{}() produced no result", ctx.method)),
        }
    }

    async fn call(
        &self,
        method: ContentMethod,
        tenant: Option<&TenantContext>,
        id: Option<&str>,
        filters: Filters,
        data: Option<Record>,
    ) -> Result<HookContext> {
        if !self.capabilities.allows(&method) {
            bail_pack!(
                method_not_allowed,
                "Method `{}` is not supported by `{}`",
                method,
                self.content_type
            );
        }

        let Some(tenant) = tenant else {
            tracing::debug!(
                content_type = %self.content_type,
                method = %method,
                "rejecting request without tenant context"
            );
            bail_pack!(not_authenticated, "Tenant ID not found in token");
        };

        if matches!(
            method,
            ContentMethod::Create | ContentMethod::Update | ContentMethod::Patch
        ) && !data.as_ref().is_some_and(Value::is_object)
        {
            bail_pack!(bad_request, "Request body must be a JSON object");
        }

        let mut ctx = HookContext::new(tenant.clone(), self.content_type.clone(), method);
        ctx.filters = filters;
        ctx.data = data;

        // Ownership check happens-before any mutation. Storage is driven by
        // this checked target, never by anything a hook can touch.
        let target = match id {
            Some(id) => {
                let record = self.owned_record(tenant, id).await?;
                ctx.id = Some(id.to_string());
                ctx.existing = Some(record.clone());
                Some(Target {
                    id: id.to_string(),
                    record,
                })
            }
            None => None,
        };

        let hooks = self.shared.hooks_for(&self.content_type, &method);

        if let Err(err) = self.pipeline(&hooks, &mut ctx, tenant, target).await {
            ctx.error = Some(err);
            for hook in &hooks.error {
                if let Err(hook_err) = hook.run(&mut ctx).await {
                    tracing::warn!(
                        content_type = %self.content_type,
                        method = %method,
                        error = %hook_err,
                        "error hook failed"
                    );
                }
            }
            return Err(ctx
                .error
                .take()
                .unwrap_or_else(|| anyhow!("{method}() failed")));
        }

        self.emit(&ctx);
        Ok(ctx)
    }

    async fn owned_record(&self, tenant: &TenantContext, id: &str) -> Result<Record> {
        let Some(record) = self.store.find_one(&self.content_type, id).await? else {
            bail_pack!(not_found, "{} not found", self.label);
        };

        if record_tenant(&record) != Some(tenant.tenant_id.as_str()) {
            tracing::warn!(
                content_type = %self.content_type,
                id = %id,
                tenant = %tenant.tenant_id,
                "cross-tenant access denied"
            );
            bail_pack!(forbidden, "Access denied to this tenant's content");
        }

        Ok(record)
    }

    async fn pipeline(
        &self,
        hooks: &MethodHooks,
        ctx: &mut HookContext,
        tenant: &TenantContext,
        target: Option<Target>,
    ) -> Result<()> {
        for hook in &hooks.before {
            hook.run(ctx).await?;
        }

        let outcome = policy::evaluate(
            &ctx.method,
            &tenant.tenant_id,
            std::mem::take(&mut ctx.filters),
            ctx.data.take(),
        );
        ctx.filters = outcome.filters;
        ctx.data = outcome.body;

        ctx.result = Some(self.execute(ctx, target).await?);

        for hook in &hooks.after {
            hook.run(ctx).await?;
        }

        Ok(())
    }

    async fn execute(&self, ctx: &mut HookContext, target: Option<Target>) -> Result<HookResult> {
        let content_type = self.content_type.as_str();

        let result = match ctx.method {
            ContentMethod::Find => {
                HookResult::Many(self.store.find(content_type, &ctx.filters).await?)
            }
            ContentMethod::Get => HookResult::One(Self::require(target, ctx.method)?.record),
            ContentMethod::Create => {
                let data = Self::take_data(ctx)?;
                HookResult::One(self.store.create(content_type, data).await?)
            }
            ContentMethod::Update | ContentMethod::Patch => {
                let target = Self::require(target, ctx.method)?;
                let data = Self::take_data(ctx)?;
                HookResult::One(self.store.update(content_type, &target.id, data).await?)
            }
            ContentMethod::Remove => {
                let target = Self::require(target, ctx.method)?;
                HookResult::One(self.store.delete(content_type, &target.id).await?)
            }
            ContentMethod::Publish => {
                let target = Self::require(target, ctx.method)?;
                let body = json!({ PUBLISHED_AT_FIELD: Utc::now().to_rfc3339() });
                HookResult::One(self.store.update(content_type, &target.id, body).await?)
            }
            ContentMethod::Unpublish => {
                let target = Self::require(target, ctx.method)?;
                let body = json!({ PUBLISHED_AT_FIELD: Value::Null });
                HookResult::One(self.store.update(content_type, &target.id, body).await?)
            }
        };

        Ok(result)
    }

    fn take_data(ctx: &mut HookContext) -> Result<Record> {
        ctx.data
            .take()
            .ok_or_else(|| PackError::bad_request("Request body is required").into_anyhow())
    }

    fn require(target: Option<Target>, method: ContentMethod) -> Result<Target> {
        target.ok_or_else(|| PackError::bad_request(format!("{method}() requires an id")).into_anyhow())
    }

    fn emit(&self, ctx: &HookContext) {
        let Some(action) = ChangeAction::from_method(&ctx.method) else {
            return;
        };

        let entry = match &ctx.result {
            Some(HookResult::One(record)) => Some(record),
            _ => None,
        };

        let event = ChangeEvent::new(
            ctx.tenant.tenant_id.clone(),
            self.content_type.clone(),
            action,
            entry,
            TriggerSource::LifecycleHook,
        );

        self.shared.events().publish(event);
    }
}
