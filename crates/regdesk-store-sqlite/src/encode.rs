//! Mapping between domain types and SQLite rows.
//!
//! The kind tag is stored as its snake_case name, dates as `YYYY-MM-DD` text.
//! Each variant lives in its own table; [`payload_table`] and
//! [`payload_column`] name the table and the identity column pointing at it.

use chrono::NaiveDate;
use regdesk_core::registration::{
  BasicSignup, PlatformProfile, RegistrationData, RegistrationKind, SocialMediaSignup,
  UserData,
};
use rusqlite::{Row, types::Type};

use crate::Result;

const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── Kind ─────────────────────────────────────────────────────────────────────

pub fn encode_kind(kind: RegistrationKind) -> &'static str { kind.into() }

/// Read a `kind` column, rejecting tags no variant answers to.
pub fn kind_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<RegistrationKind> {
  let raw: String = row.get(idx)?;
  raw
    .parse()
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn payload_table(kind: RegistrationKind) -> &'static str {
  match kind {
    RegistrationKind::SocialMedia => "social_media_signups",
    RegistrationKind::PlatformRegistration => "platform_registrations",
    RegistrationKind::BasicSignup => "basic_signups",
  }
}

/// The `registrations` column holding the foreign key into
/// [`payload_table`]`(kind)`.
pub fn payload_column(kind: RegistrationKind) -> &'static str {
  match kind {
    RegistrationKind::SocialMedia => "social_media_id",
    RegistrationKind::PlatformRegistration => "platform_registration_id",
    RegistrationKind::BasicSignup => "basic_signup_id",
  }
}

// ─── Dates ────────────────────────────────────────────────────────────────────

pub fn encode_date(date: NaiveDate) -> String { date.format(DATE_FORMAT).to_string() }

pub fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
  let raw: String = row.get(idx)?;
  NaiveDate::parse_from_str(&raw, DATE_FORMAT)
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ─── Row types ────────────────────────────────────────────────────────────────

/// A `registrations` row.
pub struct IdentityRow {
  pub id:                       i64,
  pub kind:                     RegistrationKind,
  pub social_media_id:          Option<i64>,
  pub platform_registration_id: Option<i64>,
  pub basic_signup_id:          Option<i64>,
}

impl IdentityRow {
  pub const COLUMNS: &'static str =
    "id, kind, social_media_id, platform_registration_id, basic_signup_id";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                       row.get(0)?,
      kind:                     kind_column(row, 1)?,
      social_media_id:          row.get(2)?,
      platform_registration_id: row.get(3)?,
      basic_signup_id:          row.get(4)?,
    })
  }

  /// The variant table and row id this identity points at, judged by which
  /// foreign key is set rather than by the tag.
  pub fn payload_ref(&self) -> Option<(RegistrationKind, i64)> {
    self
      .social_media_id
      .map(|id| (RegistrationKind::SocialMedia, id))
      .or(
        self
          .platform_registration_id
          .map(|id| (RegistrationKind::PlatformRegistration, id)),
      )
      .or(self.basic_signup_id.map(|id| (RegistrationKind::BasicSignup, id)))
  }
}

/// A variant payload row, as written to or read from its table.
pub enum PayloadRow {
  SocialMedia(SocialMediaSignup),
  PlatformRegistration {
    profile:       PlatformProfile,
    password_hash: String,
  },
  BasicSignup(BasicSignup),
}

impl PayloadRow {
  /// Build the row for a new registration, hashing the password if any.
  pub fn from_data(data: &RegistrationData) -> Result<Self> {
    Ok(match data {
      RegistrationData::SocialMedia(d) => Self::SocialMedia(d.clone()),
      RegistrationData::PlatformRegistration(d) => Self::PlatformRegistration {
        profile:       d.profile(),
        password_hash: d.password.hash()?,
      },
      RegistrationData::BasicSignup(d) => Self::BasicSignup(d.clone()),
    })
  }

  pub fn kind(&self) -> RegistrationKind {
    match self {
      Self::SocialMedia(_) => RegistrationKind::SocialMedia,
      Self::PlatformRegistration { .. } => RegistrationKind::PlatformRegistration,
      Self::BasicSignup(_) => RegistrationKind::BasicSignup,
    }
  }

  pub fn unique_key(&self) -> &str {
    match self {
      Self::SocialMedia(d) => &d.mobile_number,
      Self::PlatformRegistration { profile, .. } => &profile.email,
      Self::BasicSignup(d) => &d.mobile_number,
    }
  }

  pub fn into_user_data(self) -> UserData {
    match self {
      Self::SocialMedia(d) => UserData::SocialMedia(d),
      Self::PlatformRegistration { profile, .. } => UserData::PlatformRegistration(profile),
      Self::BasicSignup(d) => UserData::BasicSignup(d),
    }
  }

  /// `SELECT` for the payload of `kind` by id; column order matches
  /// [`PayloadRow::from_row`].
  pub fn select_sql(kind: RegistrationKind) -> &'static str {
    match kind {
      RegistrationKind::SocialMedia => {
        "SELECT first_name, last_name, mobile_number, hashtag
         FROM social_media_signups WHERE id = ?1"
      }
      RegistrationKind::PlatformRegistration => {
        "SELECT first_name, last_name, email, company_name, password_hash
         FROM platform_registrations WHERE id = ?1"
      }
      RegistrationKind::BasicSignup => {
        "SELECT first_name, last_name, mobile_number, date_of_birth
         FROM basic_signups WHERE id = ?1"
      }
    }
  }

  pub fn from_row(kind: RegistrationKind, row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(match kind {
      RegistrationKind::SocialMedia => Self::SocialMedia(SocialMediaSignup {
        first_name:    row.get(0)?,
        last_name:     row.get(1)?,
        mobile_number: row.get(2)?,
        hashtag:       row.get(3)?,
      }),
      RegistrationKind::PlatformRegistration => Self::PlatformRegistration {
        profile:       PlatformProfile {
          first_name:   row.get(0)?,
          last_name:    row.get(1)?,
          email:        row.get(2)?,
          company_name: row.get(3)?,
        },
        password_hash: row.get(4)?,
      },
      RegistrationKind::BasicSignup => Self::BasicSignup(BasicSignup {
        first_name:    row.get(0)?,
        last_name:     row.get(1)?,
        mobile_number: row.get(2)?,
        date_of_birth: date_column(row, 3)?,
      }),
    })
  }
}
