//! Core types and trait definitions for the Campus Connect session layer.
//!
//! This crate is deliberately free of database dependencies. The session
//! store and the storage backends depend on it; it depends on nothing
//! proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod documents;
pub mod error;
pub mod identity;
pub mod profile;
pub mod provider;
pub mod record;
pub mod session;
pub mod validate;

pub use error::{Error, ProviderError, Result};
pub use identity::{Identity, Role};
pub use profile::{CorporateProfile, Profile, StudentProfile};
