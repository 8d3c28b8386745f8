use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use common::pagination::Pagination;
use models::booking::{self, BookingStatus};

use super::domain::{self, Actor, BookingAction, TransitionError};
use super::repository::{BookingRepository, BookingRole};
use crate::errors::ServiceError;

/// Bookings may not start further out than this.
pub const MAX_ADVANCE_DAYS: i64 = 365;

/// Request to book a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBooking {
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<TransitionError> for ServiceError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::UnknownAction(_) => ServiceError::Validation(e.to_string()),
            TransitionError::NotAParty | TransitionError::NotAllowed { .. } => ServiceError::Forbidden(e.to_string()),
            TransitionError::InvalidState { .. } => ServiceError::Conflict(e.to_string()),
        }
    }
}

/// Application service encapsulating booking rules.
pub struct BookingService<R: BookingRepository> {
    repo: Arc<R>,
}

impl<R: BookingRepository> BookingService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Book a listing as `customer_id`.
    ///
    /// The listing must exist and be active, must not belong to the customer,
    /// and the slot must start in the future but within `MAX_ADVANCE_DAYS`.
    #[instrument(skip(self, input), fields(customer_id = %customer_id, listing_id = %input.service_id))]
    pub async fn create(&self, customer_id: Uuid, input: CreateBooking) -> Result<booking::Model, ServiceError> {
        let listing = self.repo
            .get_listing(input.service_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("service"))?;
        if !listing.active {
            return Err(ServiceError::Validation("service is not accepting bookings".into()));
        }
        if listing.owner_id == customer_id {
            return Err(ServiceError::Validation("cannot book your own service".into()));
        }
        let now = Utc::now();
        if input.start_time <= now {
            return Err(ServiceError::Validation("start_time must be in the future".into()));
        }
        if input.start_time > now + Duration::days(MAX_ADVANCE_DAYS) {
            return Err(ServiceError::Validation(format!("start_time must be within {MAX_ADVANCE_DAYS} days")));
        }
        let created = self.repo
            .insert_pending(&listing, customer_id, input.start_time, input.notes.as_deref())
            .await?;
        info!(booking_id = %created.id, owner_id = %created.owner_id, price_cents = created.price_cents, "booking_created");
        Ok(created)
    }

    /// Fetch a booking visible to `viewer` (its customer or the listing owner).
    pub async fn get(&self, viewer: Uuid, id: Uuid) -> Result<booking::Model, ServiceError> {
        let found = self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("booking"))?;
        if !found.involves(viewer) {
            return Err(ServiceError::Forbidden("not a party to this booking".into()));
        }
        Ok(found)
    }

    pub async fn list(&self, user_id: Uuid, role: BookingRole, status: Option<BookingStatus>, page: Pagination) -> Result<Vec<booking::Model>, ServiceError> {
        self.repo.list_for(user_id, role, status, page).await
    }

    /// Apply a status action on behalf of `actor_id`.
    #[instrument(skip(self), fields(actor_id = %actor_id, booking_id = %id, action = %action))]
    pub async fn transition(&self, actor_id: Uuid, id: Uuid, action: BookingAction) -> Result<booking::Model, ServiceError> {
        let current = self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("booking"))?;
        let actor = Actor::for_booking(actor_id, &current);
        let next = domain::transition(action, actor, current.status)?;
        match self.repo.update_status_if(id, current.status, next).await? {
            Some(updated) => {
                info!(from = %current.status, to = %next, "booking_transition");
                Ok(updated)
            }
            None => {
                warn!(from = %current.status, "booking changed concurrently");
                Err(ServiceError::Conflict("booking was modified concurrently; reload and retry".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::repository::mock::MockBookingRepository;

    struct Fixture {
        repo: Arc<MockBookingRepository>,
        svc: BookingService<MockBookingRepository>,
        owner: Uuid,
        customer: Uuid,
        listing_id: Uuid,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(MockBookingRepository::default());
        let owner = Uuid::new_v4();
        let listing = repo.add_listing(owner, 4200, 90, true);
        Fixture { svc: BookingService::new(repo.clone()), repo, owner, customer: Uuid::new_v4(), listing_id: listing.id }
    }

    fn request(listing_id: Uuid) -> CreateBooking {
        CreateBooking { service_id: listing_id, start_time: Utc::now() + Duration::days(1), notes: Some(" gate code 12 ".into()) }
    }

    #[tokio::test]
    async fn create_snapshots_listing_terms() {
        let f = fixture();
        let b = f.svc.create(f.customer, request(f.listing_id)).await.unwrap();
        assert_eq!(b.status, BookingStatus::Pending);
        assert_eq!(b.owner_id, f.owner);
        assert_eq!(b.price_cents, 4200);
        assert_eq!(b.end_time - b.start_time, Duration::minutes(90));
        assert_eq!(b.notes.as_deref(), Some("gate code 12"));
    }

    #[tokio::test]
    async fn cannot_book_own_listing() {
        let f = fixture();
        let err = f.svc.create(f.owner, request(f.listing_id)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn cannot_book_in_the_past() {
        let f = fixture();
        let mut req = request(f.listing_id);
        req.start_time = Utc::now() - Duration::hours(1);
        assert!(matches!(f.svc.create(f.customer, req).await, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn cannot_book_beyond_the_horizon() {
        let f = fixture();
        let long = f.repo.add_listing(f.owner, 100, 1440, true);
        let mut req = request(long.id);
        req.start_time = DateTime::<Utc>::MAX_UTC - Duration::minutes(10);
        assert!(matches!(f.svc.create(f.customer, req).await, Err(ServiceError::Validation(_))));

        let mut req = request(f.listing_id);
        req.start_time = Utc::now() + Duration::days(MAX_ADVANCE_DAYS + 1);
        assert!(matches!(f.svc.create(f.customer, req).await, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn cannot_book_inactive_or_missing_listing() {
        let f = fixture();
        let inactive = f.repo.add_listing(f.owner, 100, 30, false);
        assert!(matches!(f.svc.create(f.customer, request(inactive.id)).await, Err(ServiceError::Validation(_))));
        assert!(matches!(f.svc.create(f.customer, request(Uuid::new_v4())).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn full_lifecycle_confirm_then_complete() {
        let f = fixture();
        let b = f.svc.create(f.customer, request(f.listing_id)).await.unwrap();
        let b = f.svc.transition(f.owner, b.id, BookingAction::Confirm).await.unwrap();
        assert_eq!(b.status, BookingStatus::Confirmed);
        let b = f.svc.transition(f.customer, b.id, BookingAction::Complete).await.unwrap();
        assert_eq!(b.status, BookingStatus::Completed);
        let err = f.svc.transition(f.customer, b.id, BookingAction::Cancel).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn wrong_actor_is_forbidden() {
        let f = fixture();
        let b = f.svc.create(f.customer, request(f.listing_id)).await.unwrap();
        assert!(matches!(f.svc.transition(f.customer, b.id, BookingAction::Confirm).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(f.svc.transition(f.owner, b.id, BookingAction::Cancel).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(f.svc.transition(Uuid::new_v4(), b.id, BookingAction::Complete).await, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn get_hides_booking_from_strangers() {
        let f = fixture();
        let b = f.svc.create(f.customer, request(f.listing_id)).await.unwrap();
        assert!(f.svc.get(f.owner, b.id).await.is_ok());
        assert!(matches!(f.svc.get(Uuid::new_v4(), b.id).await, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn list_splits_by_role_and_status() {
        let f = fixture();
        let first = f.svc.create(f.customer, request(f.listing_id)).await.unwrap();
        let _second = f.svc.create(f.customer, request(f.listing_id)).await.unwrap();
        f.svc.transition(f.owner, first.id, BookingAction::Reject).await.unwrap();

        let mine = f.svc.list(f.customer, BookingRole::Customer, None, Pagination::default()).await.unwrap();
        assert_eq!(mine.len(), 2);
        let incoming = f.svc.list(f.owner, BookingRole::Owner, Some(BookingStatus::Pending), Pagination::default()).await.unwrap();
        assert_eq!(incoming.len(), 1);
        let as_owner = f.svc.list(f.customer, BookingRole::Owner, None, Pagination::default()).await.unwrap();
        assert!(as_owner.is_empty());
    }

    #[tokio::test]
    async fn lost_race_reports_conflict() {
        let f = fixture();
        let b = f.svc.create(f.customer, request(f.listing_id)).await.unwrap();
        // Status flips between read and write: the rule passes on the stale read, the write must not.
        struct Racing(Arc<MockBookingRepository>);
        #[async_trait::async_trait]
        impl BookingRepository for Racing {
            async fn get_listing(&self, id: Uuid) -> Result<Option<models::listing::Model>, ServiceError> { self.0.get_listing(id).await }
            async fn insert_pending(&self, l: &models::listing::Model, c: Uuid, s: DateTime<Utc>, n: Option<&str>) -> Result<booking::Model, ServiceError> { self.0.insert_pending(l, c, s, n).await }
            async fn get(&self, id: Uuid) -> Result<Option<booking::Model>, ServiceError> {
                let snapshot = self.0.get(id).await?;
                self.0.force_status(id, BookingStatus::Cancelled);
                Ok(snapshot)
            }
            async fn list_for(&self, u: Uuid, r: BookingRole, s: Option<BookingStatus>, p: Pagination) -> Result<Vec<booking::Model>, ServiceError> { self.0.list_for(u, r, s, p).await }
            async fn update_status_if(&self, id: Uuid, e: BookingStatus, t: BookingStatus) -> Result<Option<booking::Model>, ServiceError> { self.0.update_status_if(id, e, t).await }
        }
        let racing = BookingService::new(Arc::new(Racing(f.repo.clone())));
        let err = racing.transition(f.owner, b.id, BookingAction::Confirm).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }
}
