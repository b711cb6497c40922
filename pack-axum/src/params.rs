//! Strapi-style query filters.
//!
//! `filters[title]=X` is equality, `filters[views][$ne]=3` an operator and
//! `filters[slug][$in][0]=a&filters[slug][$in][1]=b` builds a list. Other
//! query keys are ignored.

use pack_core::errors::PackError;
use pack_core::Filters;
use serde_json::{Map, Value};

const LIST_OPERATORS: [&str; 2] = ["$in", "$nin"];

fn malformed(key: &str) -> PackError {
    PackError::bad_request(format!("Malformed filter parameter: {key}"))
}

/// `[a][b]` → `["a", "b"]`.
fn bracket_segments<'a>(key: &str, mut rest: &'a str) -> Result<Vec<&'a str>, PackError> {
    let mut out = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[').ok_or_else(|| malformed(key))?;
        let end = inner.find(']').ok_or_else(|| malformed(key))?;
        out.push(&inner[..end]);
        rest = &inner[end + 1..];
    }
    Ok(out)
}

pub fn filters_from_query(pairs: Vec<(String, String)>) -> Result<Filters, PackError> {
    let mut filters = Filters::new();

    for (key, value) in pairs {
        let Some(rest) = key.strip_prefix("filters") else {
            continue;
        };
        let segments = bracket_segments(&key, rest)?;

        match segments.as_slice() {
            [field] if !field.is_empty() => {
                filters.insert(field.to_string(), Value::String(value));
            }
            [field, op] if !field.is_empty() && op.starts_with('$') => {
                operators(&mut filters, field, &key)?
                    .insert(op.to_string(), Value::String(value));
            }
            [field, op, index]
                if !field.is_empty()
                    && LIST_OPERATORS.contains(op)
                    && index.chars().all(|c| c.is_ascii_digit()) =>
            {
                let slot = operators(&mut filters, field, &key)?
                    .entry(op.to_string())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if !slot.is_array() {
                    *slot = Value::Array(Vec::new());
                }
                if let Value::Array(items) = slot {
                    items.push(Value::String(value));
                }
            }
            _ => return Err(malformed(&key)),
        }
    }

    Ok(filters)
}

/// Operator object for `field`, replacing a plain equality value.
fn operators<'a>(
    filters: &'a mut Filters,
    field: &str,
    key: &str,
) -> Result<&'a mut Map<String, Value>, PackError> {
    let slot = filters
        .entry(field.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    slot.as_object_mut().ok_or_else(|| malformed(key))
}
