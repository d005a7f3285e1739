//! HTTP request handlers, one module per resource.

pub mod auth;
pub mod profile;
pub mod public_key;
pub mod qr;
pub mod video;
pub mod watermark;
