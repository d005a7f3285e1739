//! Domain types and rules shared by every SAIVD crate.
//!
//! Nothing in here touches the network or the database: handlers call these
//! functions to validate input before reaching for a pool or a client.

pub mod error;
pub mod keys;
pub mod profile;
pub mod qr;
pub mod types;
pub mod validation;
pub mod video;
