use chrono::{DateTime, Utc};
use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How an entry in the committed award list came to be:
/// value-ordered fallback, a declared player preference, or an operator edit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationKind {
    Default,
    Preference,
    Override,
}

/// Logical allocation state of a result, derived from the two nullable
/// timestamps. This is the only place that interprets the combination.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AllocationState {
    Initial,
    Locked,
    Finalized,
}

/// A declared outcome fact: this federation id placed at this rank in this
/// division. Immutable; edited only by replacing the whole list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Winner {
    pub division: String,
    pub player_aga_id: String,
    pub place: i32,
}

/// Denormalized snapshot of one assignment, kept for audit/display
/// independent of later award mutation. `award_id` is None for an entry the
/// operator cleared client-side; such entries never survive finalize.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct ResultAward {
    pub player_id: i64,
    pub player_name: String,
    pub player_aga_id: String,
    pub place: i32,
    pub division: String,
    pub prize_title: String,
    pub award_id: Option<i64>,
    pub award_value_cents: i64,
    pub award_redeem_code: Option<String>,
    pub user_email: Option<String>,
    pub award_at: DateTime<Utc>,
    pub event_title: String,
    pub award_preference_order: Option<i32>,
    pub allocation_kind: AllocationKind,
}

#[derive(
    Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, FromJsonQueryResult, ToSchema,
)]
pub struct WinnerList(pub Vec<Winner>);

#[derive(
    Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, FromJsonQueryResult, ToSchema,
)]
pub struct ResultAwardList(pub Vec<ResultAward>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "results")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub event_id: i64,
    #[sea_orm(column_type = "Json")]
    pub winners: WinnerList,
    #[sea_orm(column_type = "Json")]
    pub awards: ResultAwardList,
    pub allocation_locked_at: Option<DateTime<Utc>>,
    pub allocation_finalized_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn allocation_state(&self) -> AllocationState {
        if self.allocation_finalized_at.is_some() {
            AllocationState::Finalized
        } else if self.allocation_locked_at.is_some() {
            AllocationState::Locked
        } else {
            AllocationState::Initial
        }
    }

    /// Only locked-without-finalized counts toward system-wide exclusivity.
    pub fn holds_active_lock(&self) -> bool {
        self.allocation_state() == AllocationState::Locked
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::events::Entity",
        from = "Column::EventId",
        to = "super::events::Column::Id"
    )]
    Event,
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
