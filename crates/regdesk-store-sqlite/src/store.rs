//! [`SqliteStore`] — the SQLite implementation of [`RegistrationStore`].

use std::path::Path;

use regdesk_core::{
  password::Password,
  patch::RegistrationPatch,
  registration::{Registration, RegistrationData, RegistrationKind},
  store::RegistrationStore,
};
use rusqlite::{Connection, ErrorCode, OptionalExtension as _, ffi};

use crate::{
  Error, Result,
  encode::{
    IdentityRow, PayloadRow, encode_date, encode_kind, kind_column, payload_column,
    payload_table,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A registration store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Number of payload rows in the table for `kind`.
  pub async fn payload_count(&self, kind: RegistrationKind) -> Result<u64> {
    let count = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!("SELECT COUNT(*) FROM {}", payload_table(kind)),
          [],
          |r| r.get::<_, i64>(0),
        )?)
      })
      .await?;
    Ok(count.unsigned_abs())
  }

  /// Number of identity rows.
  pub async fn registration_count(&self) -> Result<u64> {
    let count = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM registrations", [], |r| {
          r.get::<_, i64>(0)
        })?)
      })
      .await?;
    Ok(count.unsigned_abs())
  }

  /// The stored argon2 hash of a platform registration's password.
  pub async fn password_hash(&self, id: i64) -> Result<Option<String>> {
    let hash = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT p.password_hash
               FROM registrations r
               JOIN platform_registrations p ON p.id = r.platform_registration_id
               WHERE r.id = ?1",
              rusqlite::params![id],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(hash)
  }
}

// ─── SQL helpers (run on the connection thread) ──────────────────────────────

fn select_identity(conn: &Connection, id: i64) -> rusqlite::Result<Option<IdentityRow>> {
  conn
    .query_row(
      &format!("SELECT {} FROM registrations WHERE id = ?1", IdentityRow::COLUMNS),
      rusqlite::params![id],
      IdentityRow::from_row,
    )
    .optional()
}

/// Load the payload an identity row points at, checking that the row's tag
/// agrees with the payload it owns.
fn load_payload(
  conn: &Connection,
  identity: &IdentityRow,
) -> rusqlite::Result<Result<(i64, PayloadRow)>> {
  let Some((payload_kind, payload_id)) = identity.payload_ref() else {
    return Ok(Err(Error::MissingPayload {
      id:   identity.id,
      kind: identity.kind,
    }));
  };
  if payload_kind != identity.kind {
    return Ok(Err(Error::KindMismatch {
      id:       identity.id,
      expected: identity.kind,
      found:    payload_kind,
    }));
  }

  let row = conn
    .query_row(
      PayloadRow::select_sql(payload_kind),
      rusqlite::params![payload_id],
      |row| PayloadRow::from_row(payload_kind, row),
    )
    .optional()?;

  Ok(match row {
    Some(row) => Ok((payload_id, row)),
    None => Err(Error::MissingPayload {
      id:   identity.id,
      kind: identity.kind,
    }),
  })
}

fn unique_key_taken(conn: &Connection, row: &PayloadRow) -> rusqlite::Result<bool> {
  let kind = row.kind();
  let taken = conn
    .query_row(
      &format!(
        "SELECT 1 FROM {} WHERE {} = ?1",
        payload_table(kind),
        kind.unique_field()
      ),
      rusqlite::params![row.unique_key()],
      |_| Ok(true),
    )
    .optional()?
    .unwrap_or(false);
  Ok(taken)
}

pub(crate) fn insert_payload(conn: &Connection, row: &PayloadRow) -> rusqlite::Result<i64> {
  match row {
    PayloadRow::SocialMedia(d) => conn.execute(
      "INSERT INTO social_media_signups (first_name, last_name, mobile_number, hashtag)
       VALUES (?1, ?2, ?3, ?4)",
      rusqlite::params![d.first_name, d.last_name, d.mobile_number, d.hashtag],
    )?,
    PayloadRow::PlatformRegistration { profile, password_hash } => conn.execute(
      "INSERT INTO platform_registrations
         (first_name, last_name, email, password_hash, company_name)
       VALUES (?1, ?2, ?3, ?4, ?5)",
      rusqlite::params![
        profile.first_name,
        profile.last_name,
        profile.email,
        password_hash,
        profile.company_name,
      ],
    )?,
    PayloadRow::BasicSignup(d) => conn.execute(
      "INSERT INTO basic_signups (first_name, last_name, mobile_number, date_of_birth)
       VALUES (?1, ?2, ?3, ?4)",
      rusqlite::params![
        d.first_name,
        d.last_name,
        d.mobile_number,
        encode_date(d.date_of_birth),
      ],
    )?,
  };
  Ok(conn.last_insert_rowid())
}

fn write_payload(conn: &Connection, payload_id: i64, row: &PayloadRow) -> rusqlite::Result<()> {
  match row {
    PayloadRow::SocialMedia(d) => conn.execute(
      "UPDATE social_media_signups
       SET first_name = ?1, last_name = ?2, mobile_number = ?3, hashtag = ?4
       WHERE id = ?5",
      rusqlite::params![
        d.first_name,
        d.last_name,
        d.mobile_number,
        d.hashtag,
        payload_id,
      ],
    )?,
    PayloadRow::PlatformRegistration { profile, password_hash } => conn.execute(
      "UPDATE platform_registrations
       SET first_name = ?1, last_name = ?2, email = ?3, password_hash = ?4,
           company_name = ?5
       WHERE id = ?6",
      rusqlite::params![
        profile.first_name,
        profile.last_name,
        profile.email,
        password_hash,
        profile.company_name,
        payload_id,
      ],
    )?,
    PayloadRow::BasicSignup(d) => conn.execute(
      "UPDATE basic_signups
       SET first_name = ?1, last_name = ?2, mobile_number = ?3, date_of_birth = ?4
       WHERE id = ?5",
      rusqlite::params![
        d.first_name,
        d.last_name,
        d.mobile_number,
        encode_date(d.date_of_birth),
        payload_id,
      ],
    )?,
  };
  Ok(())
}

pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(err, _)
      if err.code == ErrorCode::ConstraintViolation
        && err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

fn duplicate(kind: RegistrationKind) -> Error {
  Error::Duplicate {
    kind,
    field: kind.unique_field(),
  }
}

// ─── RegistrationStore impl ──────────────────────────────────────────────────

impl RegistrationStore for SqliteStore {
  type Error = Error;

  async fn create(&self, data: RegistrationData) -> Result<Registration> {
    data.validate()?;
    let row = PayloadRow::from_data(&data)?;
    let kind = row.kind();

    let (id, row) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // The UNIQUE constraint is the real guard; this only turns the common
        // case into a clean error before anything is written.
        if unique_key_taken(&tx, &row)? {
          return Ok(Err(duplicate(kind)));
        }

        let payload_id = match insert_payload(&tx, &row) {
          Ok(id) => id,
          Err(e) if is_unique_violation(&e) => return Ok(Err(duplicate(kind))),
          Err(e) => return Err(e.into()),
        };

        tx.execute(
          &format!(
            "INSERT INTO registrations (kind, {}) VALUES (?1, ?2)",
            payload_column(kind)
          ),
          rusqlite::params![encode_kind(kind), payload_id],
        )?;
        let id = tx.last_insert_rowid();

        tx.commit()?;
        Ok(Ok((id, row)))
      })
      .await??;

    tracing::debug!(id, %kind, "registration stored");
    Ok(Registration {
      id,
      user_data: row.into_user_data(),
    })
  }

  async fn get(&self, id: i64) -> Result<Option<Registration>> {
    let loaded = self
      .conn
      .call(move |conn| {
        let Some(identity) = select_identity(conn, id)? else {
          return Ok(Ok(None));
        };
        Ok(load_payload(conn, &identity)?.map(|(_, row)| Some(row)))
      })
      .await??;

    Ok(loaded.map(|row| Registration {
      id,
      user_data: row.into_user_data(),
    }))
  }

  async fn kind_of(&self, id: i64) -> Result<Option<RegistrationKind>> {
    let kind = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT kind FROM registrations WHERE id = ?1",
              rusqlite::params![id],
              |row| kind_column(row, 0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(kind)
  }

  async fn update(&self, id: i64, patch: RegistrationPatch) -> Result<Registration> {
    let new_hash = match &patch {
      RegistrationPatch::PlatformRegistration(p) => {
        p.password.as_ref().map(Password::hash).transpose()?
      }
      _ => None,
    };

    let row = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(identity) = select_identity(&tx, id)? else {
          return Ok(Err(Error::NotFound(id)));
        };
        if identity.kind != patch.kind() {
          return Ok(Err(Error::KindMismatch {
            id,
            expected: identity.kind,
            found: patch.kind(),
          }));
        }
        let (payload_id, current) = match load_payload(&tx, &identity)? {
          Ok(loaded) => loaded,
          Err(e) => return Ok(Err(e)),
        };

        let updated = match (patch, current) {
          (RegistrationPatch::SocialMedia(p), PayloadRow::SocialMedia(mut d)) => {
            p.apply_to(&mut d);
            PayloadRow::SocialMedia(d)
          }
          (
            RegistrationPatch::PlatformRegistration(p),
            PayloadRow::PlatformRegistration {
              mut profile,
              password_hash,
            },
          ) => {
            p.apply_to(&mut profile);
            PayloadRow::PlatformRegistration {
              profile,
              password_hash: new_hash.unwrap_or(password_hash),
            }
          }
          (RegistrationPatch::BasicSignup(p), PayloadRow::BasicSignup(mut d)) => {
            p.apply_to(&mut d);
            PayloadRow::BasicSignup(d)
          }
          (patch, current) => {
            return Ok(Err(Error::KindMismatch {
              id,
              expected: current.kind(),
              found: patch.kind(),
            }));
          }
        };

        match write_payload(&tx, payload_id, &updated) {
          Ok(()) => {}
          Err(e) if is_unique_violation(&e) => {
            return Ok(Err(duplicate(identity.kind)));
          }
          Err(e) => return Err(e.into()),
        }

        tx.commit()?;
        Ok(Ok(updated))
      })
      .await??;

    tracing::debug!(id, kind = %row.kind(), "registration updated");
    Ok(Registration {
      id,
      user_data: row.into_user_data(),
    })
  }

  async fn delete(&self, id: i64) -> Result<()> {
    let kind = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(identity) = select_identity(&tx, id)? else {
          return Ok(Err(Error::NotFound(id)));
        };

        // Payload first; the identity's foreign key is checked at commit.
        if let Some((kind, payload_id)) = identity.payload_ref() {
          tx.execute(
            &format!("DELETE FROM {} WHERE id = ?1", payload_table(kind)),
            rusqlite::params![payload_id],
          )?;
        }
        tx.execute(
          "DELETE FROM registrations WHERE id = ?1",
          rusqlite::params![id],
        )?;

        tx.commit()?;
        Ok(Ok(identity.kind))
      })
      .await??;

    tracing::debug!(id, %kind, "registration deleted");
    Ok(())
  }
}
