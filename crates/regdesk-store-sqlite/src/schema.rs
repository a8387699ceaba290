//! SQL schema for the regdesk SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One table per registration variant. Uniqueness is per variant.
CREATE TABLE IF NOT EXISTS social_media_signups (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    mobile_number TEXT NOT NULL UNIQUE CHECK (length(mobile_number) = 10),
    hashtag       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS platform_registrations (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    company_name  TEXT
);

CREATE TABLE IF NOT EXISTS basic_signups (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    mobile_number TEXT NOT NULL UNIQUE CHECK (length(mobile_number) = 10),
    date_of_birth TEXT NOT NULL    -- YYYY-MM-DD
);

-- The identity row. Exactly the payload column matching `kind` is set.
-- Foreign keys are deferred so a delete can remove the payload first.
CREATE TABLE IF NOT EXISTS registrations (
    id                       INTEGER PRIMARY KEY AUTOINCREMENT,
    kind                     TEXT NOT NULL,
    social_media_id          INTEGER UNIQUE
        REFERENCES social_media_signups(id) DEFERRABLE INITIALLY DEFERRED,
    platform_registration_id INTEGER UNIQUE
        REFERENCES platform_registrations(id) DEFERRABLE INITIALLY DEFERRED,
    basic_signup_id          INTEGER UNIQUE
        REFERENCES basic_signups(id) DEFERRABLE INITIALLY DEFERRED,
    CHECK (
        (kind = 'social_media'
            AND social_media_id IS NOT NULL
            AND platform_registration_id IS NULL
            AND basic_signup_id IS NULL)
     OR (kind = 'platform_registration'
            AND social_media_id IS NULL
            AND platform_registration_id IS NOT NULL
            AND basic_signup_id IS NULL)
     OR (kind = 'basic_signup'
            AND social_media_id IS NULL
            AND platform_registration_id IS NULL
            AND basic_signup_id IS NOT NULL)
    )
);

PRAGMA user_version = 1;
";
