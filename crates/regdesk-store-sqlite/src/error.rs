//! Error type for `regdesk-store-sqlite`.

use regdesk_core::registration::RegistrationKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] regdesk_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("registration {0} not found")]
  NotFound(i64),

  #[error("a {kind} registration with this {field} already exists")]
  Duplicate {
    kind:  RegistrationKind,
    field: &'static str,
  },

  /// An identity row whose payload row is gone.
  #[error("registration {id} ({kind}) has no payload row")]
  MissingPayload { id: i64, kind: RegistrationKind },

  #[error("registration {id} is tagged {expected} but the payload is {found}")]
  KindMismatch {
    id:       i64,
    expected: RegistrationKind,
    found:    RegistrationKind,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for regdesk_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(e) => e,
      Error::NotFound(id) => Self::NotFound(id),
      Error::Duplicate { kind, field } => Self::DuplicateRecord { kind, field },
      Error::KindMismatch { id, expected, found } => {
        Self::KindMismatch { id, expected, found }
      }
      other => Self::Persistence(Box::new(other)),
    }
  }
}
