use axum::{extract::State, http::StatusCode};
use uuid::Uuid;

use common::{pagination::Pagination, types::Page};
use models::listing::{self, NewListing};
use service::db::listing_service::{self, ListingFilter, ListingUpdate};

use crate::auth::CurrentUser;
use crate::errors::JsonApiError;
use crate::extract::{Json, Path, Query};
use crate::state::ServerState;

#[utoipa::path(get, path = "/api/services", tag = "services", responses((status = 200, description = "Listings, newest first")))]
pub async fn list(State(state): State<ServerState>, me: CurrentUser, Query(filter): Query<ListingFilter>, Query(page): Query<Pagination>) -> Result<Json<Page<listing::Model>>, JsonApiError> {
    let items = listing_service::list_listings(&state.db, me.id, &filter, page).await?;
    let (page, per_page) = page.echo();
    Ok(Json(Page { items, page, per_page }))
}

#[utoipa::path(post, path = "/api/services", tag = "services", request_body = crate::openapi::NewListingRequest, responses((status = 201, description = "Created"), (status = 400, description = "Bad Request")))]
pub async fn create(State(state): State<ServerState>, me: CurrentUser, Json(input): Json<NewListing>) -> Result<(StatusCode, Json<listing::Model>), JsonApiError> {
    let created = listing_service::create_listing(&state.db, me.id, &input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/services/{id}", tag = "services", responses((status = 200, description = "Listing"), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<listing::Model>, JsonApiError> {
    Ok(Json(listing_service::get_listing(&state.db, id).await?))
}

pub async fn update(State(state): State<ServerState>, me: CurrentUser, Path(id): Path<Uuid>, Json(input): Json<ListingUpdate>) -> Result<Json<listing::Model>, JsonApiError> {
    Ok(Json(listing_service::update_listing(&state.db, me.id, id, input).await?))
}

pub async fn delete(State(state): State<ServerState>, me: CurrentUser, Path(id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    listing_service::delete_listing(&state.db, me.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
