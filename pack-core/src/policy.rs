//! Access policy evaluator.
//!
//! Turns a method plus the caller's tenant into the filters and body that are
//! allowed to reach storage. Pure: no I/O, no logging, never called without a
//! tenant context.

use serde_json::Value;

use crate::service::ContentMethod;
use crate::store::{Filters, Record, TENANT_FIELD};
use crate::tenant::TenantId;

/// Filters and body after tenant rules were applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyOutcome {
    pub filters: Filters,
    pub body: Option<Record>,
}

/// Apply tenant rules for `method`.
///
/// - reads: `tenant_id = <tenant>` replaces any caller-supplied `tenant_id`
///   filter, operator forms included
/// - create: `body.tenant_id` is forced to the tenant and a caller-supplied
///   `id` is dropped; storage assigns ids
/// - update / patch: a foreign `body.tenant_id` is dropped, the rest is kept
/// - everything else passes through untouched
pub fn evaluate(
    method: &ContentMethod,
    tenant: &TenantId,
    filters: Filters,
    body: Option<Record>,
) -> PolicyOutcome {
    match method {
        ContentMethod::Find | ContentMethod::Get => PolicyOutcome {
            filters: scope_filters(filters, tenant),
            body,
        },
        ContentMethod::Create => PolicyOutcome {
            filters,
            body: body.map(|b| force_owner(b, tenant)),
        },
        ContentMethod::Update | ContentMethod::Patch => PolicyOutcome {
            filters,
            body: body.map(|b| strip_foreign_owner(b, tenant)),
        },
        ContentMethod::Remove | ContentMethod::Publish | ContentMethod::Unpublish => {
            PolicyOutcome { filters, body }
        }
    }
}

fn scope_filters(mut filters: Filters, tenant: &TenantId) -> Filters {
    // Overwrite, never merge: `{"tenant_id": {"$ne": "..."}}` must not survive.
    filters.insert(
        TENANT_FIELD.to_string(),
        Value::String(tenant.as_str().to_string()),
    );
    filters
}

fn force_owner(mut body: Record, tenant: &TenantId) -> Record {
    if let Some(obj) = body.as_object_mut() {
        obj.remove("id");
        obj.insert(
            TENANT_FIELD.to_string(),
            Value::String(tenant.as_str().to_string()),
        );
    }
    body
}

fn strip_foreign_owner(mut body: Record, tenant: &TenantId) -> Record {
    if let Some(obj) = body.as_object_mut() {
        let foreign = obj
            .get(TENANT_FIELD)
            .is_some_and(|v| v.as_str() != Some(tenant.as_str()));
        if foreign {
            obj.remove(TENANT_FIELD);
        }
    }
    body
}
