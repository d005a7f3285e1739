//! Row structs and DTOs.
//!
//! Each submodule holds the `FromRow` entity matching its table plus the
//! create/update DTOs its repository accepts.

pub mod profile;
pub mod session;
pub mod user;
pub mod video;
