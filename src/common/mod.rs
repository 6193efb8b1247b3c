//! Shared utilities that glue the data domain to its callers.
pub mod config;
pub mod error;
pub mod json;
pub mod log;
pub mod time;

pub use error::{MetaCode, MetaError, MetaResult};
