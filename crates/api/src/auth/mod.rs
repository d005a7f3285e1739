//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- access-token generation/validation and refresh-token helpers.
//! - [`cookies`] -- session cookie encoding for browser clients.

pub mod cookies;
pub mod jwt;
pub mod password;
