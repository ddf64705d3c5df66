use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One fulfillable prize unit. Ownership is exclusive: at most one player
/// holds an award at any time, and NULL owner means available.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "awards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub prize_id: i64,
    pub owner_player_id: Option<i64>,
    pub redeem_code: Option<String>,
    pub value_cents: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn is_available(&self) -> bool {
        self.owner_player_id.is_none()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::prizes::Entity",
        from = "Column::PrizeId",
        to = "super::prizes::Column::Id"
    )]
    Prize,
    #[sea_orm(
        belongs_to = "super::players::Entity",
        from = "Column::OwnerPlayerId",
        to = "super::players::Column::Id"
    )]
    OwnerPlayer,
}

impl Related<super::prizes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Prize.def()
    }
}

impl Related<super::players::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OwnerPlayer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
