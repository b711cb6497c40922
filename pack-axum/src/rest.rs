use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use pack_core::errors::PackError;
use serde_json::{json, Value};

use crate::params::filters_from_query;
use crate::{PackAxumError, PackAxumState};

type JsonResult = Result<Json<Value>, PackAxumError>;

pub(crate) fn map_json_rejection(rejection: JsonRejection) -> PackAxumError {
    PackError::bad_request("Failed to parse the request body as JSON")
        .with_errors(json!({"_schema": [rejection.body_text()]}))
        .into()
}

fn map_query_rejection(rejection: QueryRejection) -> PackAxumError {
    PackError::bad_request("Failed to parse the query string")
        .with_errors(json!({"_query": [rejection.body_text()]}))
        .into()
}

/// Accepts `{"data": {...}}` as well as a bare object.
fn body_data(body: Result<Json<Value>, JsonRejection>) -> Result<Value, PackAxumError> {
    let Json(body) = body.map_err(map_json_rejection)?;
    Ok(match body {
        Value::Object(mut obj)
            if obj.len() == 1 && obj.get("data").is_some_and(Value::is_object) =>
        {
            obj.remove("data").unwrap_or_default()
        }
        other => other,
    })
}

fn data(record: Value) -> Json<Value> {
    Json(json!({ "data": record }))
}

/// `/{content_type}` and `/{content_type}/{id}[/publish|/unpublish]`.
pub fn content_router() -> Router<PackAxumState> {
    Router::new()
        .route("/{content_type}", get(find).post(create))
        .route(
            "/{content_type}/{id}",
            get(get_one).put(update).patch(patch).delete(remove),
        )
        .route("/{content_type}/{id}/publish", post(publish))
        .route("/{content_type}/{id}/unpublish", post(unpublish))
}

async fn find(
    State(state): State<PackAxumState>,
    Path(content_type): Path<String>,
    headers: HeaderMap,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> JsonResult {
    let controller = state.app.content(&content_type)?;
    let tenant = state.tenant(&headers);
    let Query(query) = query.map_err(map_query_rejection)?;
    let filters = filters_from_query(query)?;

    let records = controller.find(tenant.as_ref(), filters).await?;
    let total = records.len();
    Ok(Json(json!({ "data": records, "meta": { "total": total } })))
}

async fn create(
    State(state): State<PackAxumState>,
    Path(content_type): Path<String>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> JsonResult {
    let controller = state.app.content(&content_type)?;
    let tenant = state.tenant(&headers);
    let body = body_data(body)?;

    Ok(data(controller.create(tenant.as_ref(), body).await?))
}

async fn get_one(
    State(state): State<PackAxumState>,
    Path((content_type, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> JsonResult {
    let controller = state.app.content(&content_type)?;
    let tenant = state.tenant(&headers);

    Ok(data(controller.get(tenant.as_ref(), &id).await?))
}

async fn update(
    State(state): State<PackAxumState>,
    Path((content_type, id)): Path<(String, String)>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> JsonResult {
    let controller = state.app.content(&content_type)?;
    let tenant = state.tenant(&headers);
    let body = body_data(body)?;

    Ok(data(controller.update(tenant.as_ref(), &id, body).await?))
}

async fn patch(
    State(state): State<PackAxumState>,
    Path((content_type, id)): Path<(String, String)>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> JsonResult {
    let controller = state.app.content(&content_type)?;
    let tenant = state.tenant(&headers);
    let body = body_data(body)?;

    Ok(data(controller.patch(tenant.as_ref(), &id, body).await?))
}

async fn remove(
    State(state): State<PackAxumState>,
    Path((content_type, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> JsonResult {
    let controller = state.app.content(&content_type)?;
    let tenant = state.tenant(&headers);

    Ok(data(controller.remove(tenant.as_ref(), &id).await?))
}

async fn publish(
    State(state): State<PackAxumState>,
    Path((content_type, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> JsonResult {
    let controller = state.app.content(&content_type)?;
    let tenant = state.tenant(&headers);

    Ok(data(controller.publish(tenant.as_ref(), &id).await?))
}

async fn unpublish(
    State(state): State<PackAxumState>,
    Path((content_type, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> JsonResult {
    let controller = state.app.content(&content_type)?;
    let tenant = state.tenant(&headers);

    Ok(data(controller.unpublish(tenant.as_ref(), &id).await?))
}
