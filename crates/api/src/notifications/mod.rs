//! Outbound user notifications.

pub mod email;
