//! Infer which registration variant an untyped payload is.
//!
//! Without a stated type, the payload is tried against each variant in
//! [`CLASSIFICATION_ORDER`] and the first one that deserialises *and*
//! validates wins. All three variants share `first_name`/`last_name` and
//! unknown keys are ignored, so a payload carrying the fields of several
//! variants is silently claimed by the earliest of them. Callers that need a
//! specific variant put a `"type"` key in the payload; that bypasses the
//! trial order entirely.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
  Error, Result,
  registration::{RegistrationData, RegistrationKind},
};

/// Precedence used when the payload does not state its type.
pub const CLASSIFICATION_ORDER: [RegistrationKind; 3] = [
  RegistrationKind::SocialMedia,
  RegistrationKind::PlatformRegistration,
  RegistrationKind::BasicSignup,
];

/// Key under which a caller may state the registration type explicitly.
pub const TYPE_KEY: &str = "type";

/// Determine the variant of `payload` and return it validated.
///
/// Fails with [`Error::UnrecognizedPayloadShape`] when no variant accepts the
/// payload, or with [`Error::Validation`] when an explicitly stated type does
/// not.
pub fn classify(payload: Value) -> Result<RegistrationData> {
  let mut fields = match payload {
    Value::Object(fields) => fields,
    other => {
      return Err(Error::UnrecognizedPayloadShape(format!(
        "expected a JSON object, got {}",
        json_type_name(&other)
      )));
    }
  };

  if let Some(stated) = fields.remove(TYPE_KEY) {
    let kind = stated_kind(&stated)?;
    let data = parse_as(kind, &Value::Object(fields))?;
    tracing::debug!(%kind, "registration type stated by caller");
    return Ok(data);
  }

  let payload = Value::Object(fields);
  let mut rejections = Vec::with_capacity(CLASSIFICATION_ORDER.len());
  for kind in CLASSIFICATION_ORDER {
    match parse_as(kind, &payload) {
      Ok(data) => {
        tracing::debug!(%kind, "registration type inferred");
        return Ok(data);
      }
      Err(e) => rejections.push(format!("not {kind} ({e})")),
    }
  }

  Err(Error::UnrecognizedPayloadShape(rejections.join("; ")))
}

/// Deserialise and validate `payload` as one specific variant.
pub fn parse_as(kind: RegistrationKind, payload: &Value) -> Result<RegistrationData> {
  let data = match kind {
    RegistrationKind::SocialMedia => RegistrationData::SocialMedia(from_payload(payload)?),
    RegistrationKind::PlatformRegistration => {
      RegistrationData::PlatformRegistration(from_payload(payload)?)
    }
    RegistrationKind::BasicSignup => RegistrationData::BasicSignup(from_payload(payload)?),
  };
  data.validate()?;
  Ok(data)
}

fn from_payload<T: DeserializeOwned>(payload: &Value) -> Result<T> {
  T::deserialize(payload).map_err(|e| Error::validation("payload", e.to_string()))
}

fn stated_kind(value: &Value) -> Result<RegistrationKind> {
  let unknown = || {
    Error::validation(
      TYPE_KEY,
      format!(
        "expected one of {}, got {value}",
        CLASSIFICATION_ORDER.map(<&'static str>::from).join(", ")
      ),
    )
  };
  value
    .as_str()
    .ok_or_else(unknown)?
    .parse()
    .map_err(|_| unknown())
}

fn json_type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}
