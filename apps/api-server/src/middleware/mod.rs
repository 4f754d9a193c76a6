//! Application middleware.

pub mod error;
