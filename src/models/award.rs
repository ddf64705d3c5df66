use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::award_entity;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AwardQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// When set, restrict to available (true) or assigned (false) awards
    pub available: Option<bool>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AwardResponse {
    pub id: i64,
    pub prize_id: i64,
    pub owner_player_id: Option<i64>,
    pub redeem_code: Option<String>,
    pub value_cents: i64,
    pub available: bool,
}

impl From<award_entity::Model> for AwardResponse {
    fn from(m: award_entity::Model) -> Self {
        let available = m.is_available();
        AwardResponse {
            id: m.id,
            prize_id: m.prize_id,
            owner_player_id: m.owner_player_id,
            redeem_code: m.redeem_code,
            value_cents: m.value_cents,
            available,
        }
    }
}
