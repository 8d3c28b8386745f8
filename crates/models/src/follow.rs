use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "follow")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub follower_id: Uuid,
    pub followee_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Follower, Followee }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Follower => Entity::belongs_to(user::Entity).from(Column::FollowerId).to(user::Column::Id).into(),
            Relation::Followee => Entity::belongs_to(user::Entity).from(Column::FolloweeId).to(user::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn find<C: ConnectionTrait>(db: &C, follower_id: Uuid, followee_id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::FollowerId.eq(follower_id))
        .filter(Column::FolloweeId.eq(followee_id))
        .one(db)
        .await
        .map_err(errors::ModelError::db)
}

pub async fn create<C: ConnectionTrait>(db: &C, follower_id: Uuid, followee_id: Uuid) -> Result<Model, errors::ModelError> {
    if follower_id == followee_id {
        return Err(errors::ModelError::Validation("cannot follow yourself".into()));
    }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        follower_id: Set(follower_id),
        followee_id: Set(followee_id),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(errors::ModelError::db)
}
