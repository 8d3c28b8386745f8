use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, listing, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "favorite")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub listing_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User, Listing }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity).from(Column::UserId).to(user::Column::Id).into(),
            Relation::Listing => Entity::belongs_to(listing::Entity).from(Column::ListingId).to(listing::Column::Id).into(),
        }
    }
}

impl Related<listing::Entity> for Entity {
    fn to() -> RelationDef { Relation::Listing.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn find<C: ConnectionTrait>(db: &C, user_id: Uuid, listing_id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::ListingId.eq(listing_id))
        .one(db)
        .await
        .map_err(errors::ModelError::db)
}

pub async fn create<C: ConnectionTrait>(db: &C, user_id: Uuid, listing_id: Uuid) -> Result<Model, errors::ModelError> {
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        listing_id: Set(listing_id),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(errors::ModelError::db)
}
