use axum::{
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::{auth::require_auth, openapi::ApiDoc, state::ServerState};

pub mod auth;
pub mod bookings;
pub mod favorites;
pub mod messages;
pub mod posts;
pub mod services;
pub mod users;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public routes, session-protected
/// routes, API docs, CORS and request tracing.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout));

    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        // users and follows
        .route("/api/users", get(users::search))
        .route("/api/users/me", get(users::me).put(users::update_me).delete(users::delete_me))
        .route("/api/users/:id", get(users::profile))
        .route("/api/users/:id/follow", post(users::follow).delete(users::unfollow))
        .route("/api/users/:id/followers", get(users::followers))
        .route("/api/users/:id/following", get(users::following))
        // posts, comments, likes
        .route("/api/posts", get(posts::list).post(posts::create))
        .route("/api/feed", get(posts::feed))
        .route("/api/posts/:id", get(posts::get).put(posts::update).delete(posts::delete))
        .route("/api/posts/:id/comments", get(posts::list_comments).post(posts::add_comment))
        .route("/api/comments/:id", delete(posts::delete_comment))
        .route("/api/posts/:id/like", post(posts::like).delete(posts::unlike))
        // messaging
        .route("/api/conversations", get(messages::list_conversations).post(messages::start_conversation))
        .route("/api/conversations/:id/messages", get(messages::list_messages).post(messages::send_message))
        .route("/api/conversations/:id/read", post(messages::mark_read))
        .route("/api/contacts", get(messages::contacts))
        // marketplace
        .route("/api/services", get(services::list).post(services::create))
        .route("/api/services/:id", get(services::get).put(services::update).delete(services::delete))
        .route("/api/bookings", get(bookings::list).post(bookings::create))
        .route("/api/bookings/:id", get(bookings::get))
        .route("/api/bookings/:id/:action", post(bookings::transition))
        .route("/api/favorites", get(favorites::list).post(favorites::add))
        .route("/api/favorites/:service_id", delete(favorites::remove))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public
        .merge(protected)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
