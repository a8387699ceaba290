//! Allowlisted partial updates.
//!
//! An update request is an untyped field map. It is checked against the
//! allowlist of the registration's kind ([`RegistrationKind::allowed_fields`])
//! before anything else happens, then turned into a typed patch whose fields
//! are all optional. A field that is absent from the patch is left unchanged.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{
  Error, Result,
  password::Password,
  registration::{BasicSignup, PlatformProfile, RegistrationKind, SocialMediaSignup},
  validate,
};

/// Fields that may be set to `null` in an update.
const NULLABLE_FIELDS: &[&str] = &["company_name"];

/// Alternate spellings accepted in an update, as `(alias, field)`. Matches
/// the aliases accepted on create.
const FIELD_ALIASES: &[(&str, &str)] = &[("dob", "date_of_birth")];

// ─── Per-variant patches ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SocialMediaPatch {
  pub first_name:    Option<String>,
  pub last_name:     Option<String>,
  pub mobile_number: Option<String>,
  pub hashtag:       Option<String>,
}

impl SocialMediaPatch {
  fn validate(&self) -> Result<()> {
    if let Some(v) = &self.first_name {
      validate::non_empty("first_name", v)?;
    }
    if let Some(v) = &self.last_name {
      validate::non_empty("last_name", v)?;
    }
    if let Some(v) = &self.mobile_number {
      validate::mobile_number("mobile_number", v)?;
    }
    if let Some(v) = &self.hashtag {
      validate::non_empty("hashtag", v)?;
    }
    Ok(())
  }

  pub fn apply_to(self, target: &mut SocialMediaSignup) {
    if let Some(v) = self.first_name {
      target.first_name = v;
    }
    if let Some(v) = self.last_name {
      target.last_name = v;
    }
    if let Some(v) = self.mobile_number {
      target.mobile_number = v;
    }
    if let Some(v) = self.hashtag {
      target.hashtag = v;
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformPatch {
  pub first_name:   Option<String>,
  pub last_name:    Option<String>,
  pub email:        Option<String>,
  /// Hashed by the store; never applied to a [`PlatformProfile`].
  pub password:     Option<Password>,
  /// `Some(None)` clears the company name.
  #[serde(default, deserialize_with = "present")]
  pub company_name: Option<Option<String>>,
}

impl PlatformPatch {
  fn validate(&self) -> Result<()> {
    if let Some(v) = &self.first_name {
      validate::non_empty("first_name", v)?;
    }
    if let Some(v) = &self.last_name {
      validate::non_empty("last_name", v)?;
    }
    if let Some(v) = &self.email {
      validate::email("email", v)?;
    }
    if let Some(v) = &self.password {
      validate::password("password", v.expose())?;
    }
    Ok(())
  }

  /// Apply every field except `password` to `target`.
  pub fn apply_to(self, target: &mut PlatformProfile) {
    if let Some(v) = self.first_name {
      target.first_name = v;
    }
    if let Some(v) = self.last_name {
      target.last_name = v;
    }
    if let Some(v) = self.email {
      target.email = v;
    }
    if let Some(v) = self.company_name {
      target.company_name = v;
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BasicPatch {
  pub first_name:    Option<String>,
  pub last_name:     Option<String>,
  pub mobile_number: Option<String>,
  pub date_of_birth: Option<NaiveDate>,
}

impl BasicPatch {
  fn validate(&self) -> Result<()> {
    if let Some(v) = &self.first_name {
      validate::non_empty("first_name", v)?;
    }
    if let Some(v) = &self.last_name {
      validate::non_empty("last_name", v)?;
    }
    if let Some(v) = &self.mobile_number {
      validate::mobile_number("mobile_number", v)?;
    }
    Ok(())
  }

  pub fn apply_to(self, target: &mut BasicSignup) {
    if let Some(v) = self.first_name {
      target.first_name = v;
    }
    if let Some(v) = self.last_name {
      target.last_name = v;
    }
    if let Some(v) = self.mobile_number {
      target.mobile_number = v;
    }
    if let Some(v) = self.date_of_birth {
      target.date_of_birth = v;
    }
  }
}

// ─── RegistrationPatch ───────────────────────────────────────────────────────

/// A validated partial update for one registration kind.
#[derive(Debug, Clone)]
pub enum RegistrationPatch {
  SocialMedia(SocialMediaPatch),
  PlatformRegistration(PlatformPatch),
  BasicSignup(BasicPatch),
}

impl RegistrationPatch {
  /// Build a patch for a registration of `kind` from an update request.
  ///
  /// Every key must be in `kind`'s allowlist; otherwise the whole update is
  /// rejected with [`Error::InvalidFieldsForType`] naming all offending keys.
  pub fn from_fields(kind: RegistrationKind, fields: Map<String, Value>) -> Result<Self> {
    let allowed = kind.allowed_fields();
    let fields = resolve_aliases(allowed, fields)?;

    let mut invalid: Vec<String> = fields
      .keys()
      .filter(|k| !allowed.contains(&k.as_str()))
      .cloned()
      .collect();
    if !invalid.is_empty() {
      invalid.sort();
      return Err(Error::InvalidFieldsForType {
        kind,
        invalid,
        allowed: allowed.to_vec(),
      });
    }

    if let Some(field) = fields
      .iter()
      .find(|(k, v)| v.is_null() && !NULLABLE_FIELDS.contains(&k.as_str()))
      .map(|(k, _)| k)
    {
      return Err(Error::validation(field.as_str(), "must not be null"));
    }

    let value = Value::Object(fields);
    let patch = match kind {
      RegistrationKind::SocialMedia => Self::SocialMedia(from_value(value)?),
      RegistrationKind::PlatformRegistration => {
        Self::PlatformRegistration(from_value(value)?)
      }
      RegistrationKind::BasicSignup => Self::BasicSignup(from_value(value)?),
    };
    patch.validate()?;
    Ok(patch)
  }

  pub fn kind(&self) -> RegistrationKind {
    match self {
      Self::SocialMedia(_) => RegistrationKind::SocialMedia,
      Self::PlatformRegistration(_) => RegistrationKind::PlatformRegistration,
      Self::BasicSignup(_) => RegistrationKind::BasicSignup,
    }
  }

  fn validate(&self) -> Result<()> {
    match self {
      Self::SocialMedia(p) => p.validate(),
      Self::PlatformRegistration(p) => p.validate(),
      Self::BasicSignup(p) => p.validate(),
    }
  }
}

/// Rename aliased keys to the field they stand for, when that field is
/// allowed. An alias given alongside its field is ambiguous.
fn resolve_aliases(
  allowed: &[&str],
  mut fields: Map<String, Value>,
) -> Result<Map<String, Value>> {
  for &(alias, field) in FIELD_ALIASES {
    if !allowed.contains(&field) {
      continue;
    }
    let Some(value) = fields.remove(alias) else {
      continue;
    };
    if fields.contains_key(field) {
      return Err(Error::validation(
        field,
        format!("given both as `{field}` and as `{alias}`"),
      ));
    }
    fields.insert(field.to_string(), value);
  }
  Ok(fields)
}

fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
  serde_json::from_value(value).map_err(|e| Error::validation("update", e.to_string()))
}

/// Distinguish an explicit `null` (`Some(None)`) from an absent key (`None`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  T::deserialize(deserializer).map(Some)
}
