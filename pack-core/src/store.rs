//! Storage collaborator contract.
//!
//! Pack does not execute queries itself. A [`ContentStore`] is whatever
//! content backend sits underneath; the tenant-scoping layer only decides
//! which filters and bodies reach it.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// A content record: a JSON object with `id`, `tenant_id` and domain fields.
pub type Record = Value;

/// Query filters. Top-level keys are ANDed; a value is either a literal for
/// equality or an operator object such as `{"$ne": "x"}`.
pub type Filters = Map<String, Value>;

/// Field carrying record ownership.
pub const TENANT_FIELD: &str = "tenant_id";

/// Field toggled by publish / unpublish.
pub const PUBLISHED_AT_FIELD: &str = "published_at";

/// Create/read/update/delete contract per content type.
///
/// Each call is assumed atomic for a single record or a filtered query.
/// `update` merges the body into the stored record.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn find(&self, content_type: &str, filters: &Filters) -> Result<Vec<Record>>;

    async fn find_one(&self, content_type: &str, id: &str) -> Result<Option<Record>>;

    async fn create(&self, content_type: &str, body: Record) -> Result<Record>;

    async fn update(&self, content_type: &str, id: &str, body: Record) -> Result<Record>;

    async fn delete(&self, content_type: &str, id: &str) -> Result<Record>;
}

/// Owner of a record, if it carries one.
pub fn record_tenant(record: &Record) -> Option<&str> {
    record.get(TENANT_FIELD).and_then(Value::as_str)
}

/// Record id as a string; numeric ids are rendered in decimal.
pub fn record_id(record: &Record) -> Option<String> {
    scalar_string(record.get("id")?)
}

pub fn record_slug(record: &Record) -> Option<String> {
    scalar_string(record.get("slug")?)
}

fn scalar_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
