//! Request extractors for authentication.
//!
//! - [`auth::AuthUser`] -- the authenticated user from a Bearer token or
//!   session cookie.

pub mod auth;
