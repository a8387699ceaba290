//! Error types for `regdesk-core`.

use thiserror::Error;

use crate::registration::RegistrationKind;

#[derive(Debug, Error)]
pub enum Error {
  /// The payload satisfied none of the registration schemas.
  #[error("unrecognized registration shape: {0}")]
  UnrecognizedPayloadShape(String),

  #[error("a {kind} registration with this {field} already exists")]
  DuplicateRecord {
    kind:  RegistrationKind,
    field: &'static str,
  },

  #[error("registration {0} not found")]
  NotFound(i64),

  #[error(
    "invalid fields for {kind} registration: {}; allowed fields: {}",
    .invalid.join(", "),
    .allowed.join(", ")
  )]
  InvalidFieldsForType {
    kind:    RegistrationKind,
    invalid: Vec<String>,
    allowed: Vec<&'static str>,
  },

  #[error("invalid {field}: {message}")]
  Validation { field: String, message: String },

  /// The identity tag and the variant payload disagree.
  #[error("registration {id} is tagged {expected} but the payload is {found}")]
  KindMismatch {
    id:       i64,
    expected: RegistrationKind,
    found:    RegistrationKind,
  },

  #[error("password hashing failed: {0}")]
  PasswordHash(String),

  #[error("persistence failure: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Validation {
      field:   field.into(),
      message: message.into(),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
