//! Bookable services offered by users ("services" in the public API).
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, post, user};

pub const MAX_DURATION_MINUTES: i32 = 24 * 60;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_listing")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category: String,
    pub price_cents: i64,
    pub duration_minutes: i32,
    pub location: Option<String>,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Owner }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Owner => Entity::belongs_to(user::Entity).from(Column::OwnerId).to(user::Column::Id).into() }
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Input for a new listing, validated as a whole by [`NewListing::validate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub category: String,
    pub price_cents: i64,
    pub duration_minutes: i32,
    pub location: Option<String>,
}

pub fn validate_title(t: &str) -> Result<String, errors::ModelError> { post::validate_text("title", t, 200) }

pub fn validate_category(c: &str) -> Result<String, errors::ModelError> {
    Ok(post::validate_text("category", c, 64)?.to_ascii_lowercase())
}

pub fn validate_price(cents: i64) -> Result<(), errors::ModelError> {
    if cents < 0 { return Err(errors::ModelError::Validation("price_cents must be >= 0".into())); }
    Ok(())
}

pub fn validate_duration(minutes: i32) -> Result<(), errors::ModelError> {
    if !(1..=MAX_DURATION_MINUTES).contains(&minutes) {
        return Err(errors::ModelError::Validation(format!("duration_minutes must be within 1..={MAX_DURATION_MINUTES}")));
    }
    Ok(())
}

impl NewListing {
    /// Validate every field and return the normalized copy.
    pub fn validate(&self) -> Result<NewListing, errors::ModelError> {
        let title = validate_title(&self.title)?;
        let category = validate_category(&self.category)?;
        let description = self.description.trim().to_string();
        if description.chars().count() > 10_000 {
            return Err(errors::ModelError::Validation("description too long (<=10000)".into()));
        }
        validate_price(self.price_cents)?;
        validate_duration(self.duration_minutes)?;
        let location = self.location.as_deref().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string);
        Ok(NewListing { title, description, category, price_cents: self.price_cents, duration_minutes: self.duration_minutes, location })
    }
}

pub async fn create<C: ConnectionTrait>(db: &C, owner_id: Uuid, input: &NewListing) -> Result<Model, errors::ModelError> {
    let input = input.validate()?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner_id),
        title: Set(input.title),
        description: Set(input.description),
        category: Set(input.category),
        price_cents: Set(input.price_cents),
        duration_minutes: Set(input.duration_minutes),
        location: Set(input.location),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(errors::ModelError::db)
}
