use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{errors, listing, user};

pub const MAX_NOTES_CHARS: usize = 2000;

/// Lifecycle of a booking. Stored as lowercase text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

impl std::str::FromStr for BookingStatus {
    type Err = errors::ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "rejected" => Ok(BookingStatus::Rejected),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(errors::ModelError::Validation(format!("unknown booking status '{other}'"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub listing_id: Uuid,
    pub customer_id: Uuid,
    pub owner_id: Uuid,
    pub status: BookingStatus,
    pub start_time: DateTimeWithTimeZone,
    pub end_time: DateTimeWithTimeZone,
    pub price_cents: i64,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Listing, Customer }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Listing => Entity::belongs_to(listing::Entity).from(Column::ListingId).to(listing::Column::Id).into(),
            Relation::Customer => Entity::belongs_to(user::Entity).from(Column::CustomerId).to(user::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.customer_id == user_id || self.owner_id == user_id
    }
}

/// End of a slot that starts at `start` and lasts `duration_minutes`.
pub fn end_time_for(start: DateTime<Utc>, duration_minutes: i32) -> Result<DateTime<Utc>, errors::ModelError> {
    start
        .checked_add_signed(Duration::minutes(duration_minutes as i64))
        .ok_or_else(|| errors::ModelError::Validation("start_time is out of range".into()))
}

pub fn validate_notes(notes: Option<&str>) -> Result<Option<String>, errors::ModelError> {
    match notes.map(str::trim) {
        None | Some("") => Ok(None),
        Some(n) if n.chars().count() > MAX_NOTES_CHARS => Err(errors::ModelError::Validation(format!("notes too long (<={MAX_NOTES_CHARS})"))),
        Some(n) => Ok(Some(n.to_string())),
    }
}

/// Insert a pending booking for `customer_id` on `listing`, snapshotting price and owner.
pub async fn create_pending<C: ConnectionTrait>(
    db: &C,
    listing: &listing::Model,
    customer_id: Uuid,
    start: DateTime<Utc>,
    notes: Option<&str>,
) -> Result<Model, errors::ModelError> {
    let notes = validate_notes(notes)?;
    let end = end_time_for(start, listing.duration_minutes)?;
    let now = Utc::now();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        listing_id: Set(listing.id),
        customer_id: Set(customer_id),
        owner_id: Set(listing.owner_id),
        status: Set(BookingStatus::Pending),
        start_time: Set(start.into()),
        end_time: Set(end.into()),
        price_cents: Set(listing.price_cents),
        notes: Set(notes),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    am.insert(db).await.map_err(errors::ModelError::db)
}
