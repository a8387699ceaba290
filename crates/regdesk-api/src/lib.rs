//! JSON HTTP API for regdesk.
//!
//! Exposes an axum [`Router`] backed by any
//! [`regdesk_core::store::RegistrationStore`]. Tracing layers, TLS and
//! listener setup are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = regdesk_api::api_router(Arc::new(store));
//! ```

pub mod error;
pub mod registrations;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use regdesk_core::store::RegistrationStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// Every path is served with and without a trailing slash.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: RegistrationStore + 'static,
{
  Router::new()
    .route("/add_user", post(registrations::add::<S>))
    .route("/add_user/", post(registrations::add::<S>))
    .route("/get_user/{id}", get(registrations::get_one::<S>))
    .route("/get_user/{id}/", get(registrations::get_one::<S>))
    .route("/update_user/{id}", put(registrations::update::<S>))
    .route("/update_user/{id}/", put(registrations::update::<S>))
    .route("/delete_user/{id}", delete(registrations::delete_one::<S>))
    .route("/delete_user/{id}/", delete(registrations::delete_one::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use regdesk_core::password::Password;
  use regdesk_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::api_router;

  async fn store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().await.unwrap())
  }

  async fn oneshot_raw(
    store:  &Arc<SqliteStore>,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(json) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    api_router(store.clone()).oneshot(req).await.unwrap()
  }

  async fn body_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn social_payload() -> Value {
    json!({
      "first_name":    "A",
      "last_name":     "B",
      "mobile_number": "1234567890",
      "hashtag":       "#x",
    })
  }

  fn platform_payload() -> Value {
    json!({
      "first_name":   "Grace",
      "last_name":    "Hopper",
      "email":        "grace@example.com",
      "password":     "cobol!",
      "company_name": "Navy",
    })
  }

  fn basic_payload() -> Value {
    json!({
      "first_name":    "Ada",
      "last_name":     "Lovelace",
      "mobile_number": "0987654321",
      "date_of_birth": "1815-12-10",
    })
  }

  async fn create(store: &Arc<SqliteStore>, payload: Value) -> i64 {
    let resp = oneshot_raw(store, "POST", "/add_user", Some(payload)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await["id"].as_i64().unwrap()
  }

  // ── POST /add_user ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn add_social_media_returns_record() {
    let s = store().await;
    let resp = oneshot_raw(&s, "POST", "/add_user", Some(social_payload())).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    let id = body["id"].as_i64().expect("numeric id");
    assert_eq!(
      body,
      json!({
        "id": id,
        "user_data": {
          "first_name":    "A",
          "last_name":     "B",
          "mobile_number": "1234567890",
          "hashtag":       "#x",
        },
      })
    );
  }

  #[tokio::test]
  async fn add_platform_never_echoes_password() {
    let s = store().await;
    let resp = oneshot_raw(&s, "POST", "/add_user/", Some(platform_payload())).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["user_data"]["email"], "grace@example.com");
    assert_eq!(body["user_data"]["company_name"], "Navy");
    assert!(body["user_data"].get("password").is_none());

    let id = body["id"].as_i64().unwrap();
    let hash = s.password_hash(id).await.unwrap().unwrap();
    assert!(Password::new("cobol!").verify(&hash));
  }

  #[tokio::test]
  async fn add_basic_accepts_dob_alias() {
    let s = store().await;
    let mut payload = basic_payload();
    let dob = payload
      .as_object_mut()
      .unwrap()
      .remove("date_of_birth")
      .unwrap();
    payload["dob"] = dob;

    let resp = oneshot_raw(&s, "POST", "/add_user", Some(payload)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["user_data"]["date_of_birth"], "1815-12-10");
  }

  #[tokio::test]
  async fn add_unrecognized_shape_is_400_and_not_persisted() {
    let s = store().await;
    let resp = oneshot_raw(&s, "POST", "/add_user", Some(json!({ "foo": 1 }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = body_json(resp).await;
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("unrecognized"), "{message}");
    assert_eq!(s.registration_count().await.unwrap(), 0);
  }

  #[tokio::test]
  async fn add_overlapping_payload_uses_precedence() {
    let s = store().await;
    let mut payload = social_payload();
    payload["date_of_birth"] = json!("2000-01-01");

    let resp = oneshot_raw(&s, "POST", "/add_user", Some(payload.clone())).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["user_data"]["hashtag"], "#x");

    payload["type"] = json!("basic_signup");
    payload["mobile_number"] = json!("5555555555");
    let resp = oneshot_raw(&s, "POST", "/add_user", Some(payload)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["user_data"]["date_of_birth"], "2000-01-01");
    assert!(body["user_data"].get("hashtag").is_none());
  }

  #[tokio::test]
  async fn add_duplicate_is_409() {
    let s = store().await;
    create(&s, social_payload()).await;

    let resp = oneshot_raw(&s, "POST", "/add_user", Some(social_payload())).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(s.registration_count().await.unwrap(), 1);
  }

  #[tokio::test]
  async fn add_malformed_json_is_400() {
    let s = store().await;
    let req = Request::builder()
      .method("POST")
      .uri("/add_user")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from("{not json"))
      .unwrap();
    let resp = api_router(s.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(resp).await["error"].is_string());
  }

  #[tokio::test]
  async fn add_without_json_content_type_keeps_axum_status() {
    let s = store().await;
    let req = Request::builder()
      .method("POST")
      .uri("/add_user")
      .body(Body::from(social_payload().to_string()))
      .unwrap();
    let resp = api_router(s.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body_json(resp).await["error"].is_string());
    assert_eq!(s.registration_count().await.unwrap(), 0);
  }

  // ── GET /get_user/{id} ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn get_returns_stored_values() {
    let s = store().await;
    let id = create(&s, basic_payload()).await;

    let resp = oneshot_raw(&s, "GET", &format!("/get_user/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let mut expected = basic_payload();
    expected["date_of_birth"] = json!("1815-12-10");
    assert_eq!(body_json(resp).await, json!({ "id": id, "user_data": expected }));
  }

  #[tokio::test]
  async fn get_missing_is_404() {
    let s = store().await;
    let resp = oneshot_raw(&s, "GET", "/get_user/77/", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["error"], "registration 77 not found");
  }

  #[tokio::test]
  async fn get_non_numeric_id_is_400() {
    let s = store().await;
    let resp = oneshot_raw(&s, "GET", "/get_user/abc", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── PUT /update_user/{id} ───────────────────────────────────────────────────

  #[tokio::test]
  async fn update_applies_allowed_fields() {
    let s = store().await;
    let id = create(&s, platform_payload()).await;

    let resp = oneshot_raw(
      &s,
      "PUT",
      &format!("/update_user/{id}"),
      Some(json!({ "company_name": null, "password": "n3w-pass" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["user_data"]["company_name"], Value::Null);
    assert_eq!(body["user_data"]["email"], "grace@example.com");
    assert!(body["user_data"].get("password").is_none());

    let hash = s.password_hash(id).await.unwrap().unwrap();
    assert!(Password::new("n3w-pass").verify(&hash));
  }

  #[tokio::test]
  async fn update_accepts_dob_alias() {
    let s = store().await;
    let id = create(&s, basic_payload()).await;

    let resp = oneshot_raw(
      &s,
      "PUT",
      &format!("/update_user/{id}"),
      Some(json!({ "dob": "1990-02-03" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["user_data"]["date_of_birth"], "1990-02-03");
  }

  #[tokio::test]
  async fn update_with_foreign_field_is_400_and_unchanged() {
    let s = store().await;
    let id = create(&s, social_payload()).await;

    let resp = oneshot_raw(
      &s,
      "PUT",
      &format!("/update_user/{id}/"),
      Some(json!({ "email": "x@y.com" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("email"), "{message}");

    let resp = oneshot_raw(&s, "GET", &format!("/get_user/{id}"), None).await;
    assert_eq!(body_json(resp).await["user_data"], social_payload());
  }

  #[tokio::test]
  async fn update_with_invalid_value_is_400() {
    let s = store().await;
    let id = create(&s, social_payload()).await;

    let resp = oneshot_raw(
      &s,
      "PUT",
      &format!("/update_user/{id}"),
      Some(json!({ "mobile_number": "12ab" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn update_into_taken_key_is_409() {
    let s = store().await;
    create(&s, social_payload()).await;
    let mut other = social_payload();
    other["mobile_number"] = json!("2222222222");
    let id = create(&s, other).await;

    let resp = oneshot_raw(
      &s,
      "PUT",
      &format!("/update_user/{id}"),
      Some(json!({ "mobile_number": "1234567890" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn update_missing_is_404() {
    let s = store().await;
    let resp = oneshot_raw(
      &s,
      "PUT",
      "/update_user/5",
      Some(json!({ "first_name": "Z" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── DELETE /delete_user/{id} ────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_then_get_is_404() {
    let s = store().await;
    let id = create(&s, social_payload()).await;

    let resp = oneshot_raw(&s, "DELETE", &format!("/delete_user/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_json(resp).await["message"].is_string());

    let resp = oneshot_raw(&s, "GET", &format!("/get_user/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(s.registration_count().await.unwrap(), 0);
  }

  #[tokio::test]
  async fn delete_missing_is_404() {
    let s = store().await;
    let resp = oneshot_raw(&s, "DELETE", "/delete_user/9/", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
