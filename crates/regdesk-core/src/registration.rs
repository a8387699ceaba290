//! Registration variants — the three signup forms and their read model.
//!
//! A registration is an identity (numeric id + [`RegistrationKind`] tag) that
//! owns exactly one variant payload. Input payloads are the `*Signup` /
//! [`PlatformRegistration`] structs; reads return [`UserData`], which never
//! carries a password.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{Result, password::Password, validate};

// ─── Discriminant ────────────────────────────────────────────────────────────

/// Which of the three signup forms a registration came from. The snake_case
/// string is both the JSON `type` value and the `kind` column in storage.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RegistrationKind {
  SocialMedia,
  PlatformRegistration,
  BasicSignup,
}

impl RegistrationKind {
  /// The field that must be unique among registrations of this kind.
  pub fn unique_field(self) -> &'static str {
    match self {
      Self::SocialMedia | Self::BasicSignup => "mobile_number",
      Self::PlatformRegistration => "email",
    }
  }

  /// Field names an update request may touch for this kind.
  pub fn allowed_fields(self) -> &'static [&'static str] {
    match self {
      Self::SocialMedia => {
        &["first_name", "last_name", "mobile_number", "hashtag"]
      }
      Self::PlatformRegistration => {
        &["first_name", "last_name", "email", "password", "company_name"]
      }
      Self::BasicSignup => {
        &["first_name", "last_name", "mobile_number", "date_of_birth"]
      }
    }
  }
}

// ─── Variant payloads ────────────────────────────────────────────────────────

/// Signup through a social-media campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialMediaSignup {
  pub first_name:    String,
  pub last_name:     String,
  pub mobile_number: String,
  pub hashtag:       String,
}

impl SocialMediaSignup {
  pub fn validate(&self) -> Result<()> {
    validate::non_empty("first_name", &self.first_name)?;
    validate::non_empty("last_name", &self.last_name)?;
    validate::mobile_number("mobile_number", &self.mobile_number)?;
    validate::non_empty("hashtag", &self.hashtag)
  }
}

/// Registration for the project-management platform.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformRegistration {
  pub first_name:   String,
  pub last_name:    String,
  pub email:        String,
  pub password:     Password,
  #[serde(default)]
  pub company_name: Option<String>,
}

impl PlatformRegistration {
  pub fn validate(&self) -> Result<()> {
    validate::non_empty("first_name", &self.first_name)?;
    validate::non_empty("last_name", &self.last_name)?;
    validate::email("email", &self.email)?;
    validate::password("password", self.password.expose())
  }

  /// The client-visible fields, password excluded.
  pub fn profile(&self) -> PlatformProfile {
    PlatformProfile {
      first_name:   self.first_name.clone(),
      last_name:    self.last_name.clone(),
      email:        self.email.clone(),
      company_name: self.company_name.clone(),
    }
  }
}

/// The plain signup form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicSignup {
  pub first_name:    String,
  pub last_name:     String,
  pub mobile_number: String,
  /// Also accepted as `dob`.
  #[serde(alias = "dob")]
  pub date_of_birth: NaiveDate,
}

impl BasicSignup {
  pub fn validate(&self) -> Result<()> {
    validate::non_empty("first_name", &self.first_name)?;
    validate::non_empty("last_name", &self.last_name)?;
    validate::mobile_number("mobile_number", &self.mobile_number)
  }
}

// ─── RegistrationData ────────────────────────────────────────────────────────

/// A validated registration payload, ready to be persisted.
#[derive(Debug, Clone)]
pub enum RegistrationData {
  SocialMedia(SocialMediaSignup),
  PlatformRegistration(PlatformRegistration),
  BasicSignup(BasicSignup),
}

impl RegistrationData {
  pub fn kind(&self) -> RegistrationKind {
    match self {
      Self::SocialMedia(_) => RegistrationKind::SocialMedia,
      Self::PlatformRegistration(_) => RegistrationKind::PlatformRegistration,
      Self::BasicSignup(_) => RegistrationKind::BasicSignup,
    }
  }

  pub fn validate(&self) -> Result<()> {
    match self {
      Self::SocialMedia(d) => d.validate(),
      Self::PlatformRegistration(d) => d.validate(),
      Self::BasicSignup(d) => d.validate(),
    }
  }

  /// The read model for this payload, password excluded.
  pub fn user_data(&self) -> UserData {
    match self {
      Self::SocialMedia(d) => UserData::SocialMedia(d.clone()),
      Self::PlatformRegistration(d) => UserData::PlatformRegistration(d.profile()),
      Self::BasicSignup(d) => UserData::BasicSignup(d.clone()),
    }
  }
}

// ─── Read model ──────────────────────────────────────────────────────────────

/// Platform registration fields a client may see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformProfile {
  pub first_name:   String,
  pub last_name:    String,
  pub email:        String,
  pub company_name: Option<String>,
}

/// The payload half of a stored registration, as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserData {
  SocialMedia(SocialMediaSignup),
  PlatformRegistration(PlatformProfile),
  BasicSignup(BasicSignup),
}

impl UserData {
  pub fn kind(&self) -> RegistrationKind {
    match self {
      Self::SocialMedia(_) => RegistrationKind::SocialMedia,
      Self::PlatformRegistration(_) => RegistrationKind::PlatformRegistration,
      Self::BasicSignup(_) => RegistrationKind::BasicSignup,
    }
  }
}

/// A persisted registration: the identity id and its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
  pub id:        i64,
  pub user_data: UserData,
}

impl Registration {
  pub fn kind(&self) -> RegistrationKind { self.user_data.kind() }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use serde_json::json;

  use super::*;

  #[test]
  fn kind_strings_match_storage_and_json() {
    let kind = RegistrationKind::PlatformRegistration;
    assert_eq!(kind.to_string(), "platform_registration");
    assert_eq!(<&'static str>::from(kind), "platform_registration");
    assert_eq!(
      serde_json::to_value(kind).unwrap(),
      json!("platform_registration")
    );
    assert_eq!(
      RegistrationKind::from_str("basic_signup").unwrap(),
      RegistrationKind::BasicSignup
    );
    assert!(RegistrationKind::from_str("vip").is_err());
  }

  #[test]
  fn basic_signup_accepts_dob_alias() {
    let signup: BasicSignup = serde_json::from_value(json!({
      "first_name": "Ada",
      "last_name": "Lovelace",
      "mobile_number": "1234567890",
      "dob": "1815-12-10",
    }))
    .unwrap();
    assert_eq!(
      signup.date_of_birth,
      NaiveDate::from_ymd_opt(1815, 12, 10).unwrap()
    );
  }

  #[test]
  fn platform_user_data_has_no_password() {
    let data = RegistrationData::PlatformRegistration(PlatformRegistration {
      first_name:   "Grace".into(),
      last_name:    "Hopper".into(),
      email:        "grace@navy.mil".into(),
      password:     Password::new("cobol!"),
      company_name: None,
    });
    let value = serde_json::to_value(data.user_data()).unwrap();
    assert!(value.get("password").is_none());
    assert_eq!(value["email"], "grace@navy.mil");
    assert_eq!(value["company_name"], serde_json::Value::Null);
  }

  #[test]
  fn registration_serialises_as_id_and_user_data() {
    let reg = Registration {
      id:        7,
      user_data: UserData::SocialMedia(SocialMediaSignup {
        first_name:    "A".into(),
        last_name:     "B".into(),
        mobile_number: "1234567890".into(),
        hashtag:       "#x".into(),
      }),
    };
    assert_eq!(
      serde_json::to_value(&reg).unwrap(),
      json!({
        "id": 7,
        "user_data": {
          "first_name": "A",
          "last_name": "B",
          "mobile_number": "1234567890",
          "hashtag": "#x",
        },
      })
    );
  }

  #[test]
  fn user_data_deserialises_to_the_right_variant() {
    let basic: UserData = serde_json::from_value(json!({
      "first_name": "A",
      "last_name": "B",
      "mobile_number": "1234567890",
      "date_of_birth": "2000-01-31",
    }))
    .unwrap();
    assert_eq!(basic.kind(), RegistrationKind::BasicSignup);

    let platform: UserData = serde_json::from_value(json!({
      "first_name": "A",
      "last_name": "B",
      "email": "a@b.io",
      "company_name": null,
    }))
    .unwrap();
    assert_eq!(platform.kind(), RegistrationKind::PlatformRegistration);
  }
}
