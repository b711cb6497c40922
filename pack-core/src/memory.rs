//! In-memory [`ContentStore`].
//!
//! Records live in `content_type -> id -> record` maps behind a tokio
//! `RwLock`. Good enough for the dev server and tests; nothing is persisted.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::PackError;
use crate::store::{ContentStore, Filters, Record};

type Table = HashMap<String, Record>;

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn not_found(id: &str) -> anyhow::Error {
        PackError::not_found(format!("Record not found: {id}")).into_anyhow()
    }

    fn object(body: Record) -> Result<Map<String, Value>> {
        match body {
            Value::Object(obj) => Ok(obj),
            _ => Err(PackError::bad_request("Record body must be a JSON object").into_anyhow()),
        }
    }
}

/// Loose comparison: `"7"` matches `7`, `"true"` matches `true`.
fn loose_eq(actual: Option<&Value>, expected: &Value) -> bool {
    match (actual, expected) {
        (None, Value::Null) => true,
        (None, _) => false,
        (Some(a), e) if a == e => true,
        (Some(Value::Number(n)), Value::String(s)) | (Some(Value::String(s)), Value::Number(n)) => {
            n.to_string() == *s
        }
        (Some(Value::Bool(b)), Value::String(s)) | (Some(Value::String(s)), Value::Bool(b)) => {
            b.to_string() == *s
        }
        _ => false,
    }
}

fn in_list(actual: Option<&Value>, list: &Value) -> Result<bool> {
    match list {
        Value::Array(items) => Ok(items.iter().any(|item| loose_eq(actual, item))),
        // `?filters[x][$in]=a,b` arrives as one string.
        Value::String(s) => Ok(s
            .split(',')
            .any(|item| loose_eq(actual, &Value::String(item.trim().to_string())))),
        _ => Err(PackError::bad_request("$in / $nin expect a list").into_anyhow()),
    }
}

fn field_matches(actual: Option<&Value>, condition: &Value) -> Result<bool> {
    let Value::Object(ops) = condition else {
        return Ok(loose_eq(actual, condition));
    };

    for (op, operand) in ops {
        let ok = match op.as_str() {
            "$eq" => loose_eq(actual, operand),
            "$ne" => !loose_eq(actual, operand),
            "$in" => in_list(actual, operand)?,
            "$nin" => !in_list(actual, operand)?,
            other => {
                return Err(
                    PackError::bad_request(format!("Unsupported filter operator: {other}"))
                        .into_anyhow(),
                )
            }
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn matches(record: &Record, filters: &Filters) -> Result<bool> {
    for (field, condition) in filters {
        if !field_matches(record.get(field), condition)? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn find(&self, content_type: &str, filters: &Filters) -> Result<Vec<Record>> {
        let tables = self.tables.read().await;
        let Some(table) = tables.get(content_type) else {
            return Ok(vec![]);
        };

        let mut out = Vec::new();
        for record in table.values() {
            if matches(record, filters)? {
                out.push(record.clone());
            }
        }
        // Stable order for clients; HashMap iteration is not.
        out.sort_by(|a, b| {
            let key = |r: &Record| r.get("created_at").and_then(Value::as_str).map(str::to_string);
            key(a).cmp(&key(b))
        });
        Ok(out)
    }

    async fn find_one(&self, content_type: &str, id: &str) -> Result<Option<Record>> {
        let tables = self.tables.read().await;
        Ok(tables.get(content_type).and_then(|t| t.get(id)).cloned())
    }

    async fn create(&self, content_type: &str, body: Record) -> Result<Record> {
        let mut obj = Self::object(body)?;

        // Ids are always minted here; a body `id` never picks the slot.
        let id = Uuid::new_v4().to_string();
        obj.insert("id".to_string(), Value::String(id.clone()));
        obj.entry("created_at")
            .or_insert_with(|| Value::String(chrono::Utc::now().to_rfc3339()));

        let record = Value::Object(obj);
        let mut tables = self.tables.write().await;
        tables
            .entry(content_type.to_string())
            .or_default()
            .insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, content_type: &str, id: &str, body: Record) -> Result<Record> {
        let patch = Self::object(body)?;

        let mut tables = self.tables.write().await;
        let stored = tables
            .get_mut(content_type)
            .and_then(|t| t.get_mut(id))
            .ok_or_else(|| Self::not_found(id))?;

        if let Some(obj) = stored.as_object_mut() {
            for (k, v) in patch {
                if k == "id" {
                    continue;
                }
                obj.insert(k, v);
            }
            obj.insert(
                "updated_at".to_string(),
                Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        Ok(stored.clone())
    }

    async fn delete(&self, content_type: &str, id: &str) -> Result<Record> {
        let mut tables = self.tables.write().await;
        tables
            .get_mut(content_type)
            .and_then(|t| t.remove(id))
            .ok_or_else(|| Self::not_found(id))
    }
}
