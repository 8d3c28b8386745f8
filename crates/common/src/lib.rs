//! Shared building blocks for the workspace: logging setup, runtime checks,
//! wire types and pagination parameters.

pub mod types;
pub mod utils;
pub mod pagination;
pub mod env;
