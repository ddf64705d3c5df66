use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::player_entity;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreatePlayerRequest {
    /// Federation id, e.g. an AGA number; unique per player
    pub aga_id: String,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerResponse {
    pub id: i64,
    pub aga_id: String,
    pub name: String,
    pub email: Option<String>,
}

impl From<player_entity::Model> for PlayerResponse {
    fn from(m: player_entity::Model) -> Self {
        PlayerResponse {
            id: m.id,
            aga_id: m.aga_id,
            name: m.name,
            email: m.email,
        }
    }
}
