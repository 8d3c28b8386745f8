//! Service layer providing business operations on top of models.
//! - Separates business rules (who may do what) from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Auth and bookings go through repository traits so their rules can be
//!   exercised against in-memory fakes.

pub mod errors;
pub mod auth;
pub mod booking;
pub mod db;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
