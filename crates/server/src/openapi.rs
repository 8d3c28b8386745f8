use chrono::{DateTime, Utc};
use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RegisterRequest { pub email: String, pub username: String, pub name: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
}

#[derive(ToSchema)]
pub struct NewPostRequest { pub content: String, pub image_url: Option<String> }

#[derive(ToSchema)]
pub struct StartConversationRequest { pub participant_id: Uuid }

#[derive(ToSchema)]
pub struct MessageRequest { pub content: String }

#[derive(ToSchema)]
pub struct NewListingRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub price_cents: i64,
    pub duration_minutes: i32,
    pub location: Option<String>,
}

#[derive(ToSchema)]
pub struct CreateBookingRequest {
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(ToSchema)]
pub struct FavoriteRequest { pub service_id: Uuid }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::users::search,
        crate::routes::users::profile,
        crate::routes::users::update_me,
        crate::routes::users::follow,
        crate::routes::posts::list,
        crate::routes::posts::feed,
        crate::routes::posts::create,
        crate::routes::messages::start_conversation,
        crate::routes::messages::list_conversations,
        crate::routes::messages::send_message,
        crate::routes::services::list,
        crate::routes::services::create,
        crate::routes::services::get,
        crate::routes::bookings::create,
        crate::routes::bookings::list,
        crate::routes::bookings::transition,
        crate::routes::favorites::add,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            ProfileUpdateRequest,
            NewPostRequest,
            StartConversationRequest,
            MessageRequest,
            NewListingRequest,
            CreateBookingRequest,
            FavoriteRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "users"),
        (name = "posts"),
        (name = "messaging"),
        (name = "services"),
        (name = "bookings"),
        (name = "favorites")
    )
)]
pub struct ApiDoc;
