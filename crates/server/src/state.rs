use std::sync::Arc;

use sea_orm::DatabaseConnection;
use service::auth::{repo::seaorm::SeaOrmAuthRepository, service::{AuthConfig, AuthService}};
use service::booking::{repository::SeaOrmBookingRepository, BookingService};

/// Shared handler state: the connection pool and session settings.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: AuthConfig,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, auth: AuthConfig) -> Self { Self { db, auth } }

    pub fn auth_service(&self) -> AuthService<SeaOrmAuthRepository> {
        AuthService::new(Arc::new(SeaOrmAuthRepository { db: self.db.clone() }), self.auth.clone())
    }

    pub fn booking_service(&self) -> BookingService<SeaOrmBookingRepository> {
        BookingService::new(Arc::new(SeaOrmBookingRepository { db: self.db.clone() }))
    }
}
