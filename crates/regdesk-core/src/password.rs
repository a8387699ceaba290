//! Plain-text passwords and their argon2 hashes.

use std::fmt;

use argon2::{
  Argon2, PasswordHasher, PasswordVerifier,
  password_hash::{PasswordHash, SaltString},
};
use rand_core::OsRng;
use serde::Deserialize;

use crate::{Error, Result};

/// A password as submitted by a client.
///
/// Deserialisable but never serialised; `Debug` does not print the value.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
  pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }

  pub fn expose(&self) -> &str { &self.0 }

  /// Hash into an argon2 PHC string with a fresh random salt.
  pub fn hash(&self) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(self.0.as_bytes(), &salt)
      .map(|hash| hash.to_string())
      .map_err(|e| Error::PasswordHash(e.to_string()))
  }

  /// Check this password against a stored PHC string. A malformed hash never
  /// verifies.
  pub fn verify(&self, phc: &str) -> bool {
    PasswordHash::new(phc)
      .map(|parsed| {
        Argon2::default()
          .verify_password(self.0.as_bytes(), &parsed)
          .is_ok()
      })
      .unwrap_or(false)
  }
}

impl fmt::Debug for Password {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Password(***)")
  }
}
