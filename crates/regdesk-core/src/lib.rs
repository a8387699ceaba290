//! Core types and trait definitions for the regdesk registration service.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the three registration variants, their field rules, the classifier that
//! infers a variant from an untyped payload, and the per-variant update
//! allowlists.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod classify;
pub mod error;
pub mod password;
pub mod patch;
pub mod registration;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
