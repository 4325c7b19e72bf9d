use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::instrument;

use crate::auth::extractors::{AdminUser, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;

use super::store::{self, ListingKind};

fn parse_payload<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::Validation(e.to_string()))
}

/// Pull `id` out of an admin request body, leaving the rest in place.
fn take_id(body: &mut Value) -> Result<String, ApiError> {
    let obj = body
        .as_object_mut()
        .ok_or_else(|| ApiError::Validation("expected a JSON object".into()))?;
    match obj.remove("id") {
        Some(Value::String(id)) if !id.is_empty() => Ok(id),
        _ => Err(ApiError::Validation("id is required".into())),
    }
}

#[instrument(skip_all)]
pub async fn list_public<K: ListingKind>(
    State(state): State<AppState>,
) -> Result<Json<Vec<K::Row>>, ApiError> {
    Ok(Json(store::list_public::<K>(&state.db).await?))
}

#[instrument(skip_all)]
pub async fn create<K: ListingKind>(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let payload: K::Create = parse_payload(body)?;
    let id = store::create::<K>(&state.db, &payload).await?;
    Ok(Json(json!({ "success": true, "id": id })))
}

#[instrument(skip_all)]
pub async fn admin_list<K: ListingKind>(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<K::Row>>, ApiError> {
    Ok(Json(store::list_all::<K>(&state.db).await?))
}

#[instrument(skip_all)]
pub async fn admin_create<K: ListingKind>(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let payload: K::Create = parse_payload(body)?;
    let id = store::create::<K>(&state.db, &payload).await?;
    Ok(Json(json!({ "success": true, "id": id })))
}

#[instrument(skip_all)]
pub async fn admin_update<K: ListingKind>(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let id = take_id(&mut body)?;
    let patch: K::Patch = parse_payload(body)?;
    store::update::<K>(&state.db, &id, &patch).await?;
    Ok(Json(json!({ "success": true })))
}

#[instrument(skip_all)]
pub async fn admin_delete<K: ListingKind>(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let id = take_id(&mut body)?;
    store::delete::<K>(&state.db, &id).await?;
    Ok(Json(json!({ "success": true })))
}
