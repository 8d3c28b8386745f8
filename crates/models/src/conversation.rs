use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "conversation")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_a_id: Uuid,
    pub user_b_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub last_message_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { UserA, UserB }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::UserA => Entity::belongs_to(user::Entity).from(Column::UserAId).to(user::Column::Id).into(),
            Relation::UserB => Entity::belongs_to(user::Entity).from(Column::UserBId).to(user::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.user_a_id == user_id || self.user_b_id == user_id
    }

    /// The participant who is not `me`, or `None` when `me` is not in the conversation.
    pub fn other_participant(&self, me: Uuid) -> Option<Uuid> {
        if self.user_a_id == me {
            Some(self.user_b_id)
        } else if self.user_b_id == me {
            Some(self.user_a_id)
        } else {
            None
        }
    }
}

/// Canonical storage order for a participant pair: smaller id first.
pub fn ordered_pair(x: Uuid, y: Uuid) -> (Uuid, Uuid) {
    if x <= y { (x, y) } else { (y, x) }
}

pub async fn find_by_pair<C: ConnectionTrait>(db: &C, x: Uuid, y: Uuid) -> Result<Option<Model>, errors::ModelError> {
    let (a, b) = ordered_pair(x, y);
    Entity::find()
        .filter(Column::UserAId.eq(a))
        .filter(Column::UserBId.eq(b))
        .one(db)
        .await
        .map_err(errors::ModelError::db)
}

pub async fn create<C: ConnectionTrait>(db: &C, x: Uuid, y: Uuid) -> Result<Model, errors::ModelError> {
    if x == y {
        return Err(errors::ModelError::Validation("cannot start a conversation with yourself".into()));
    }
    let (a, b) = ordered_pair(x, y);
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_a_id: Set(a),
        user_b_id: Set(b),
        created_at: Set(Utc::now().into()),
        last_message_at: Set(None),
    };
    am.insert(db).await.map_err(errors::ModelError::db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_order_is_symmetric() {
        let x = Uuid::new_v4();
        let y = Uuid::new_v4();
        assert_eq!(ordered_pair(x, y), ordered_pair(y, x));
        let (a, b) = ordered_pair(x, y);
        assert!(a <= b);
    }

    #[test]
    fn other_participant_resolves_both_sides() {
        let (a, b) = ordered_pair(Uuid::new_v4(), Uuid::new_v4());
        let c = Model { id: Uuid::new_v4(), user_a_id: a, user_b_id: b, created_at: Utc::now().into(), last_message_at: None };
        assert_eq!(c.other_participant(a), Some(b));
        assert_eq!(c.other_participant(b), Some(a));
        assert_eq!(c.other_participant(Uuid::new_v4()), None);
        assert!(c.has_participant(a));
    }
}
