//! The `RegistrationStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `regdesk-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  patch::RegistrationPatch,
  registration::{Registration, RegistrationData, RegistrationKind},
};

/// Abstraction over a registration store backend.
///
/// Every write runs as a single transaction: an identity row and its variant
/// payload are created, updated, and deleted together or not at all.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RegistrationStore: Send + Sync {
  /// Backend error; converts into the domain error so callers can tell
  /// duplicates and missing records apart from storage failures.
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  /// Persist a validated registration and return it with its new id.
  ///
  /// Fails with a duplicate error if a registration of the same kind already
  /// holds the payload's unique field.
  fn create(
    &self,
    data: RegistrationData,
  ) -> impl Future<Output = Result<Registration, Self::Error>> + Send + '_;

  /// Load a registration by id, password excluded. Returns `None` if not
  /// found.
  fn get(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Registration>, Self::Error>> + Send + '_;

  /// The kind tag of a registration, or `None` if not found.
  fn kind_of(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<RegistrationKind>, Self::Error>> + Send + '_;

  /// Apply `patch` to registration `id` and return the updated registration.
  ///
  /// Fails with a not-found error if `id` does not exist, and with a kind
  /// mismatch if the patch was built for a different kind.
  fn update(
    &self,
    id: i64,
    patch: RegistrationPatch,
  ) -> impl Future<Output = Result<Registration, Self::Error>> + Send + '_;

  /// Delete registration `id` and its payload. Fails with a not-found error
  /// if `id` does not exist.
  fn delete(&self, id: i64) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
