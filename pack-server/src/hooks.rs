use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use pack_core::{AfterHook, BeforeHook, ErrorHook, HookContext, PackApp, PackError};

pub struct LogBefore;

#[async_trait]
impl BeforeHook for LogBefore {
    async fn run(&self, ctx: &mut HookContext) -> Result<()> {
        tracing::debug!(
            tenant = %ctx.tenant().tenant_id,
            content_type = %ctx.content_type(),
            method = %ctx.method(),
            id = ?ctx.id(),
            "->"
        );
        Ok(())
    }
}

pub struct LogAfter;

#[async_trait]
impl AfterHook for LogAfter {
    async fn run(&self, ctx: &mut HookContext) -> Result<()> {
        tracing::debug!(
            tenant = %ctx.tenant().tenant_id,
            content_type = %ctx.content_type(),
            method = %ctx.method(),
            "<- ok"
        );
        Ok(())
    }
}

pub struct LogError;

#[async_trait]
impl ErrorHook for LogError {
    async fn run(&self, ctx: &mut HookContext) -> Result<()> {
        if let Some(err) = &ctx.error {
            let kind = PackError::kind_of(err);
            if kind.is_client_error() {
                tracing::debug!(method = %ctx.method(), content_type = %ctx.content_type(), error = %err, "<- rejected");
            } else {
                tracing::warn!(method = %ctx.method(), content_type = %ctx.content_type(), error = ?err, "<- failed");
            }
        }
        Ok(())
    }
}

pub fn global_hooks(app: &PackApp) {
    app.hooks(|h| {
        h.before_all(Arc::new(LogBefore));
        h.after_all(Arc::new(LogAfter));
        h.error_all(Arc::new(LogError));
    });
}
