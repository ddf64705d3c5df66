use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::prize_entity;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreatePrizeRequest {
    pub title: String,
    /// Value of each unit in cents, must be non-negative
    pub value_cents: i64,
    /// Number of award units to create, at least 1
    pub quantity: i32,
    /// Optional redeem codes, one per unit in order
    pub redeem_codes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PrizeResponse {
    pub id: i64,
    pub title: String,
    pub value_cents: i64,
    pub quantity: i32,
}

impl From<prize_entity::Model> for PrizeResponse {
    fn from(m: prize_entity::Model) -> Self {
        PrizeResponse {
            id: m.id,
            title: m.title,
            value_cents: m.value_cents,
            quantity: m.quantity,
        }
    }
}
