//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login and session tokens live here; the HTTP layer only
//! moves cookies and headers around.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;
pub mod token;

pub use service::AuthService;
