use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::Deserialize;
use uuid::Uuid;

use common::pagination::Pagination;
use models::{booking::{self, BookingStatus}, listing};

use crate::errors::ServiceError;

/// Which side of the booking the caller is listing from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingRole {
    #[default]
    Customer,
    Owner,
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn get_listing(&self, id: Uuid) -> Result<Option<listing::Model>, ServiceError>;
    async fn insert_pending(&self, listing: &listing::Model, customer_id: Uuid, start: DateTime<Utc>, notes: Option<&str>) -> Result<booking::Model, ServiceError>;
    async fn get(&self, id: Uuid) -> Result<Option<booking::Model>, ServiceError>;
    async fn list_for(&self, user_id: Uuid, role: BookingRole, status: Option<BookingStatus>, page: Pagination) -> Result<Vec<booking::Model>, ServiceError>;
    /// Set `to` only if the row is still in `expected`; `None` means another writer got there first.
    async fn update_status_if(&self, id: Uuid, expected: BookingStatus, to: BookingStatus) -> Result<Option<booking::Model>, ServiceError>;
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmBookingRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn get_listing(&self, id: Uuid) -> Result<Option<listing::Model>, ServiceError> {
        listing::Entity::find_by_id(id).one(&self.db).await.map_err(ServiceError::db)
    }

    async fn insert_pending(&self, listing: &listing::Model, customer_id: Uuid, start: DateTime<Utc>, notes: Option<&str>) -> Result<booking::Model, ServiceError> {
        Ok(booking::create_pending(&self.db, listing, customer_id, start, notes).await?)
    }

    async fn get(&self, id: Uuid) -> Result<Option<booking::Model>, ServiceError> {
        booking::Entity::find_by_id(id).one(&self.db).await.map_err(ServiceError::db)
    }

    async fn list_for(&self, user_id: Uuid, role: BookingRole, status: Option<BookingStatus>, page: Pagination) -> Result<Vec<booking::Model>, ServiceError> {
        let (page_idx, per_page) = page.normalize();
        let mut finder = booking::Entity::find();
        finder = match role {
            BookingRole::Customer => finder.filter(booking::Column::CustomerId.eq(user_id)),
            BookingRole::Owner => finder.filter(booking::Column::OwnerId.eq(user_id)),
        };
        if let Some(s) = status {
            finder = finder.filter(booking::Column::Status.eq(s.as_str()));
        }
        finder
            .order_by_desc(booking::Column::StartTime)
            .paginate(&self.db, per_page)
            .fetch_page(page_idx)
            .await
            .map_err(ServiceError::db)
    }

    async fn update_status_if(&self, id: Uuid, expected: BookingStatus, to: BookingStatus) -> Result<Option<booking::Model>, ServiceError> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let res = booking::Entity::update_many()
            .col_expr(booking::Column::Status, Expr::value(to.as_str()))
            .col_expr(booking::Column::UpdatedAt, Expr::value(now))
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::Status.eq(expected.as_str()))
            .exec(&self.db)
            .await
            .map_err(ServiceError::db)?;
        if res.rows_affected == 0 {
            return Ok(None);
        }
        self.get(id).await
    }
}

/// In-memory repository for service tests.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockBookingRepository {
        listings: Mutex<HashMap<Uuid, listing::Model>>,
        bookings: Mutex<HashMap<Uuid, booking::Model>>,
    }

    impl MockBookingRepository {
        pub fn add_listing(&self, owner_id: Uuid, price_cents: i64, duration_minutes: i32, active: bool) -> listing::Model {
            let now = Utc::now().into();
            let l = listing::Model {
                id: Uuid::new_v4(),
                owner_id,
                title: "Listing".into(),
                description: String::new(),
                category: "general".into(),
                price_cents,
                duration_minutes,
                location: None,
                active,
                created_at: now,
                updated_at: now,
            };
            self.listings.lock().unwrap().insert(l.id, l.clone());
            l
        }

        /// Force a booking into `status`, as a concurrent writer would.
        pub fn force_status(&self, id: Uuid, status: BookingStatus) {
            if let Some(b) = self.bookings.lock().unwrap().get_mut(&id) {
                b.status = status;
            }
        }
    }

    #[async_trait]
    impl BookingRepository for MockBookingRepository {
        async fn get_listing(&self, id: Uuid) -> Result<Option<listing::Model>, ServiceError> {
            Ok(self.listings.lock().unwrap().get(&id).cloned())
        }

        async fn insert_pending(&self, listing: &listing::Model, customer_id: Uuid, start: DateTime<Utc>, notes: Option<&str>) -> Result<booking::Model, ServiceError> {
            let notes = booking::validate_notes(notes)?;
            let end = booking::end_time_for(start, listing.duration_minutes)?;
            let now = Utc::now().into();
            let b = booking::Model {
                id: Uuid::new_v4(),
                listing_id: listing.id,
                customer_id,
                owner_id: listing.owner_id,
                status: BookingStatus::Pending,
                start_time: start.into(),
                end_time: end.into(),
                price_cents: listing.price_cents,
                notes,
                created_at: now,
                updated_at: now,
            };
            self.bookings.lock().unwrap().insert(b.id, b.clone());
            Ok(b)
        }

        async fn get(&self, id: Uuid) -> Result<Option<booking::Model>, ServiceError> {
            Ok(self.bookings.lock().unwrap().get(&id).cloned())
        }

        async fn list_for(&self, user_id: Uuid, role: BookingRole, status: Option<BookingStatus>, page: Pagination) -> Result<Vec<booking::Model>, ServiceError> {
            let (page_idx, per_page) = page.normalize();
            let mut rows: Vec<booking::Model> = self
                .bookings
                .lock()
                .unwrap()
                .values()
                .filter(|b| match role {
                    BookingRole::Customer => b.customer_id == user_id,
                    BookingRole::Owner => b.owner_id == user_id,
                })
                .filter(|b| status.map_or(true, |s| b.status == s))
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.start_time.cmp(&a.start_time));
            Ok(rows.into_iter().skip((page_idx * per_page) as usize).take(per_page as usize).collect())
        }

        async fn update_status_if(&self, id: Uuid, expected: BookingStatus, to: BookingStatus) -> Result<Option<booking::Model>, ServiceError> {
            let mut map = self.bookings.lock().unwrap();
            match map.get_mut(&id) {
                Some(b) if b.status == expected => {
                    b.status = to;
                    b.updated_at = Utc::now().into();
                    Ok(Some(b.clone()))
                }
                _ => Ok(None),
            }
        }
    }
}
