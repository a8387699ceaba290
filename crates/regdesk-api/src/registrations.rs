//! Handlers for the registration endpoints.
//!
//! | Method   | Path                | Notes |
//! |----------|---------------------|-------|
//! | `POST`   | `/add_user`         | Body: any signup form; the type is inferred |
//! | `GET`    | `/get_user/:id`     | 404 if not found |
//! | `PUT`    | `/update_user/:id`  | Body: fields allowed for the registration's type |
//! | `DELETE` | `/delete_user/:id`  | Removes the registration and its payload |

use std::sync::Arc;

use axum::{
  Json,
  extract::{FromRequest, FromRequestParts, State},
};
use regdesk_core::{
  classify::classify,
  patch::RegistrationPatch,
  registration::Registration,
  store::RegistrationStore,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

// ─── Extractors ──────────────────────────────────────────────────────────────

/// `axum::Json` with rejections reported as [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// `axum::extract::Path` with rejections reported as [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct IdPath<T>(pub T);

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /add_user` — classify the payload and store it.
pub async fn add<S>(
  State(store): State<Arc<S>>,
  JsonBody(payload): JsonBody<Value>,
) -> Result<Json<Registration>, ApiError>
where
  S: RegistrationStore,
{
  let data = classify(payload).inspect_err(|e| {
    tracing::warn!(error = %e, "rejected registration payload");
  })?;
  let kind = data.kind();

  let registration = store.create(data).await.map_err(ApiError::from_store)?;
  tracing::info!(id = registration.id, %kind, "registration created");
  Ok(Json(registration))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /get_user/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  IdPath(id): IdPath<i64>,
) -> Result<Json<Registration>, ApiError>
where
  S: RegistrationStore,
{
  let registration = store
    .get(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(regdesk_core::Error::NotFound(id))?;
  Ok(Json(registration))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /update_user/:id` — body is a map of fields to change.
///
/// The allowed keys depend on the registration's type; any other key fails
/// the whole request and nothing is changed.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  IdPath(id): IdPath<i64>,
  JsonBody(fields): JsonBody<Map<String, Value>>,
) -> Result<Json<Registration>, ApiError>
where
  S: RegistrationStore,
{
  let kind = store
    .kind_of(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(regdesk_core::Error::NotFound(id))?;

  let patch = RegistrationPatch::from_fields(kind, fields).inspect_err(|e| {
    tracing::warn!(id, %kind, error = %e, "rejected update");
  })?;

  let registration = store
    .update(id, patch)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(id, %kind, "registration updated");
  Ok(Json(registration))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Deleted {
  pub message: String,
}

/// `DELETE /delete_user/:id`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  IdPath(id): IdPath<i64>,
) -> Result<Json<Deleted>, ApiError>
where
  S: RegistrationStore,
{
  store.delete(id).await.map_err(ApiError::from_store)?;
  tracing::info!(id, "registration deleted");
  Ok(Json(Deleted {
    message: format!("registration {id} deleted"),
  }))
}
