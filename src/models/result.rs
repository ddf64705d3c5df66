use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{AllocationState, ResultAward, Winner, result_entity};

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateResultRequest {
    pub event_id: i64,
    /// Declared order is preserved; it decides who picks first during
    /// allocation.
    pub winners: Vec<Winner>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ReplaceWinnersRequest {
    pub winners: Vec<Winner>,
}

/// Operator-reviewed proposal list submitted for finalize. Entries the
/// operator cleared keep their row but carry a null award_id.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct FinalizeAwardsRequest {
    pub awards: Vec<ResultAward>,
}

/// Response of the recommendation and deallocation calls. Recommendations
/// are a client-side proposal set; nothing but the lock is persisted.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AllocationProposalResponse {
    pub recommendations: Vec<ResultAward>,
    pub locked: bool,
    pub finalized: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResultResponse {
    pub id: i64,
    pub event_id: i64,
    pub winners: Vec<Winner>,
    pub awards: Vec<ResultAward>,
    pub allocation_state: AllocationState,
    pub locked: bool,
    pub finalized: bool,
    pub allocation_locked_at: Option<DateTime<Utc>>,
    pub allocation_finalized_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<result_entity::Model> for ResultResponse {
    fn from(m: result_entity::Model) -> Self {
        let state = m.allocation_state();
        ResultResponse {
            id: m.id,
            event_id: m.event_id,
            winners: m.winners.0,
            awards: m.awards.0,
            allocation_state: state,
            locked: m.allocation_locked_at.is_some(),
            finalized: m.allocation_finalized_at.is_some(),
            allocation_locked_at: m.allocation_locked_at,
            allocation_finalized_at: m.allocation_finalized_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
