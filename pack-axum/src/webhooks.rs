//! `POST /webhooks/trigger-build` and `GET /webhooks/config`.

use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use pack_core::errors::PackError;
use pack_core::{ChangeAction, ChangeEvent, TenantId, TriggerSource};
use pack_webhooks::ChangeEventDispatcher;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::rest::map_json_rejection;
use crate::{PackAxumError, PackAxumState};

#[derive(Debug, Deserialize)]
pub struct TriggerBuildRequest {
    pub tenant_id: String,
    pub content_type: String,
    pub action: String,
    #[serde(default)]
    pub entry: Option<Value>,
}

pub fn webhook_router() -> Router<PackAxumState> {
    Router::new()
        .route("/trigger-build", post(trigger_build))
        .route("/config", get(config))
}

fn dispatcher(state: &PackAxumState) -> Result<&ChangeEventDispatcher, PackAxumError> {
    state
        .webhooks
        .as_ref()
        .ok_or_else(|| PackError::not_found("Webhooks are not enabled").into())
}

async fn trigger_build(
    State(state): State<PackAxumState>,
    headers: HeaderMap,
    body: Result<Json<TriggerBuildRequest>, JsonRejection>,
) -> Result<Json<Value>, PackAxumError> {
    let dispatcher = dispatcher(&state)?;
    let Json(req) = body.map_err(map_json_rejection)?;

    let tenant_id = TenantId::new(req.tenant_id)?;
    let action: ChangeAction = req.action.parse()?;

    // Anonymous triggers are allowed; an authenticated caller may only
    // trigger its own tenant.
    if let Some(caller) = state.tenant(&headers) {
        if caller.tenant_id != tenant_id {
            tracing::warn!(
                caller = %caller.tenant_id,
                requested = %tenant_id,
                "cross-tenant build trigger denied"
            );
            return Err(PackError::forbidden("Access denied to this tenant's content").into());
        }
    }

    let Some(endpoint) = dispatcher.registry().resolve(&tenant_id) else {
        return Err(PackError::bad_request(format!(
            "No webhook URL configured for tenant: {tenant_id}"
        ))
        .into());
    };

    let event = ChangeEvent::new(
        tenant_id.clone(),
        req.content_type,
        action,
        req.entry.as_ref(),
        TriggerSource::ManualTrigger,
    );

    tracing::info!(
        tenant = %tenant_id,
        content_type = %event.content_type,
        action = %action,
        "build webhook triggered"
    );
    dispatcher.dispatch(event.clone());

    Ok(Json(json!({
        "success": true,
        "message": format!("Build webhook triggered for tenant: {tenant_id}"),
        "webhook_url": endpoint.webhook_url,
        "payload": event,
    })))
}

async fn config(
    State(state): State<PackAxumState>,
    headers: HeaderMap,
) -> Result<Json<Value>, PackAxumError> {
    let dispatcher = dispatcher(&state)?;
    let Some(tenant) = state.tenant(&headers) else {
        return Err(PackError::not_authenticated("Tenant ID not found in token").into());
    };

    Ok(Json(json!({ "data": dispatcher.registry().describe(&tenant.tenant_id) })))
}
