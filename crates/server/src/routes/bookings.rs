use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use common::{pagination::Pagination, types::Page};
use models::booking::{self, BookingStatus};
use service::booking::{domain::BookingAction, repository::BookingRole, service::CreateBooking};
use service::errors::ServiceError;

use crate::auth::CurrentUser;
use crate::errors::JsonApiError;
use crate::extract::{Json, Path, Query};
use crate::state::ServerState;

#[derive(Debug, Default, Deserialize)]
pub struct BookingsQuery {
    #[serde(default)]
    pub role: BookingRole,
    pub status: Option<String>,
}

#[utoipa::path(post, path = "/api/bookings", tag = "bookings", request_body = crate::openapi::CreateBookingRequest, responses((status = 201, description = "Pending booking"), (status = 400, description = "Inactive, own or past"), (status = 404, description = "Unknown service")))]
pub async fn create(State(state): State<ServerState>, me: CurrentUser, Json(input): Json<CreateBooking>) -> Result<(StatusCode, Json<booking::Model>), JsonApiError> {
    let created = state.booking_service().create(me.id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/bookings", tag = "bookings", responses((status = 200, description = "Bookings as customer or owner")))]
pub async fn list(State(state): State<ServerState>, me: CurrentUser, Query(q): Query<BookingsQuery>, Query(page): Query<Pagination>) -> Result<Json<Page<booking::Model>>, JsonApiError> {
    let status = match q.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => Some(s.parse::<BookingStatus>().map_err(ServiceError::from)?),
        None => None,
    };
    let items = state.booking_service().list(me.id, q.role, status, page).await?;
    let (page, per_page) = page.echo();
    Ok(Json(Page { items, page, per_page }))
}

pub async fn get(State(state): State<ServerState>, me: CurrentUser, Path(id): Path<Uuid>) -> Result<Json<booking::Model>, JsonApiError> {
    Ok(Json(state.booking_service().get(me.id, id).await?))
}

/// Apply `cancel`, `confirm`, `reject` or `complete`.
#[utoipa::path(post, path = "/api/bookings/{id}/{action}", tag = "bookings", responses((status = 200, description = "Transitioned"), (status = 400, description = "Unknown action"), (status = 403, description = "Not allowed for caller"), (status = 409, description = "Wrong prior status")))]
pub async fn transition(State(state): State<ServerState>, me: CurrentUser, Path((id, action)): Path<(Uuid, String)>) -> Result<Json<booking::Model>, JsonApiError> {
    let action = action.parse::<BookingAction>().map_err(ServiceError::from)?;
    Ok(Json(state.booking_service().transition(me.id, id, action).await?))
}
