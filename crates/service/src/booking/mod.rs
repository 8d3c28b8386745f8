//! Bookings: the one piece of multi-state logic in the marketplace.
//!
//! `domain` holds the status transition rule as a pure function; the
//! service applies it and persists through a compare-and-set update.

pub mod domain;
pub mod repository;
pub mod service;

pub use service::BookingService;
