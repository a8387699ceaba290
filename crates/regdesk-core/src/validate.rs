//! Field-level rules shared by the classifier and the update path.
//!
//! Every check takes the field name so failures can say which field was
//! rejected.

use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

/// Number of ASCII digits a mobile number must have.
pub const MOBILE_NUMBER_LEN: usize = 10;

/// Minimum password length in characters.
pub const PASSWORD_MIN_LEN: usize = 6;

#[allow(clippy::expect_used)] // good regex, it doesn't panic
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex should not panic")
});

/// Required free-text field: must contain something other than whitespace.
pub fn non_empty(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::validation(field, "must not be empty"));
  }
  Ok(())
}

pub fn mobile_number(field: &str, value: &str) -> Result<()> {
  if value.len() != MOBILE_NUMBER_LEN || !value.bytes().all(|b| b.is_ascii_digit()) {
    return Err(Error::validation(
      field,
      format!("must be exactly {MOBILE_NUMBER_LEN} digits"),
    ));
  }
  Ok(())
}

pub fn email(field: &str, value: &str) -> Result<()> {
  if !EMAIL_REGEX.is_match(value) {
    return Err(Error::validation(field, "must look like local@domain.tld"));
  }
  Ok(())
}

pub fn password(field: &str, value: &str) -> Result<()> {
  if value.chars().count() < PASSWORD_MIN_LEN {
    return Err(Error::validation(
      field,
      format!("must be at least {PASSWORD_MIN_LEN} characters"),
    ));
  }
  Ok(())
}
