use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::award_preference_entity;

/// Wholesale replacement of a player's ranked preferences; the list order
/// is the ranking, most preferred first.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ReplacePreferencesRequest {
    pub award_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PreferenceResponse {
    pub award_id: i64,
    pub preference_order: i32,
}

impl From<award_preference_entity::Model> for PreferenceResponse {
    fn from(m: award_preference_entity::Model) -> Self {
        PreferenceResponse {
            award_id: m.award_id,
            preference_order: m.preference_order,
        }
    }
}
