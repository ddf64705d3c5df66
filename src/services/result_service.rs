use crate::entities::{
    AllocationState, ResultAwardList, Winner, WinnerList, event_entity as events,
    result_entity as results,
};
use crate::error::{AppError, AppResult};
use crate::models::{CreateResultRequest, ResultResponse};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set, SqlErr,
};

fn validate_winners(winners: &[Winner]) -> AppResult<()> {
    for winner in winners {
        if winner.division.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Winner division must not be empty".to_string(),
            ));
        }
        if winner.player_aga_id.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Winner federation id must not be empty".to_string(),
            ));
        }
        if winner.place < 1 {
            return Err(AppError::ValidationError(format!(
                "Winner place must be positive, got {}",
                winner.place
            )));
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct ResultService {
    pool: DatabaseConnection,
}

impl ResultService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Create the result aggregate for an event, winners only; allocation
    /// fields start empty. One result per event.
    pub async fn create(&self, req: &CreateResultRequest) -> AppResult<ResultResponse> {
        validate_winners(&req.winners)?;

        events::Entity::find_by_id(req.event_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", req.event_id)))?;

        let now = Utc::now();
        let insert = results::ActiveModel {
            event_id: Set(req.event_id),
            winners: Set(WinnerList(req.winners.clone())),
            awards: Set(ResultAwardList::default()),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&self.pool)
        .await;

        match insert {
            Ok(result) => Ok(result.into()),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(AppError::Conflict(format!(
                    "A result already exists for event {}",
                    req.event_id
                ))),
                _ => Err(e.into()),
            },
        }
    }

    pub async fn get(&self, result_id: i64) -> AppResult<ResultResponse> {
        Ok(self.find(result_id).await?.into())
    }

    /// Replace the whole winner list (the import path). Rejected while the
    /// result is finalized, since the committed snapshot would no longer
    /// match the winners.
    pub async fn replace_winners(
        &self,
        result_id: i64,
        winners: Vec<Winner>,
    ) -> AppResult<ResultResponse> {
        validate_winners(&winners)?;

        let result = self.find(result_id).await?;
        if result.allocation_state() == AllocationState::Finalized {
            return Err(AppError::ValidationError(format!(
                "Result {result_id} is finalized; deallocate before replacing winners"
            )));
        }

        let mut am = result.into_active_model();
        am.winners = Set(WinnerList(winners));
        am.updated_at = Set(Some(Utc::now()));
        let updated = am.update(&self.pool).await?;

        Ok(updated.into())
    }

    /// Soft delete. Only an untouched (INITIAL) result may go; anything
    /// locked or finalized must be deallocated first.
    pub async fn delete(&self, result_id: i64) -> AppResult<()> {
        let result = self.find(result_id).await?;
        if result.allocation_state() != AllocationState::Initial {
            return Err(AppError::ValidationError(format!(
                "Result {result_id} is mid-allocation or finalized; deallocate before deleting"
            )));
        }

        let mut am = result.into_active_model();
        am.deleted_at = Set(Some(Utc::now()));
        am.update(&self.pool).await?;
        Ok(())
    }

    async fn find(&self, result_id: i64) -> AppResult<results::Model> {
        results::Entity::find_by_id(result_id)
            .filter(results::Column::DeletedAt.is_null())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Result {result_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support as support;

    fn winner(aga_id: &str, place: i32) -> Winner {
        Winner {
            division: "DAN".to_string(),
            player_aga_id: aga_id.to_string(),
            place,
        }
    }

    #[tokio::test]
    async fn test_create_preserves_declared_order() {
        let pool = support::connect().await;
        let event = support::seed_event(&pool, "Congress").await;
        let service = ResultService::new(pool.clone());

        let created = service
            .create(&CreateResultRequest {
                event_id: event.id,
                winners: vec![winner("30", 1), winner("10", 2), winner("20", 3)],
            })
            .await
            .unwrap();

        assert_eq!(created.allocation_state, AllocationState::Initial);
        let ids: Vec<&str> = created
            .winners
            .iter()
            .map(|w| w.player_aga_id.as_str())
            .collect();
        assert_eq!(ids, vec!["30", "10", "20"]);
    }

    #[tokio::test]
    async fn test_one_result_per_event() {
        let pool = support::connect().await;
        let event = support::seed_event(&pool, "Congress").await;
        let service = ResultService::new(pool.clone());

        let req = CreateResultRequest {
            event_id: event.id,
            winners: vec![winner("10", 1)],
        };
        service.create(&req).await.unwrap();

        let err = service.create(&req).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_winner() {
        let pool = support::connect().await;
        let event = support::seed_event(&pool, "Congress").await;
        let service = ResultService::new(pool.clone());

        let err = service
            .create(&CreateResultRequest {
                event_id: event.id,
                winners: vec![winner("10", 0)],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_create_requires_event() {
        let pool = support::connect().await;
        let service = ResultService::new(pool.clone());

        let err = service
            .create(&CreateResultRequest {
                event_id: 12345,
                winners: vec![winner("10", 1)],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_replace_winners() {
        let pool = support::connect().await;
        let event = support::seed_event(&pool, "Congress").await;
        let result = support::seed_result(&pool, event.id, vec![winner("10", 1)]).await;
        let service = ResultService::new(pool.clone());

        let updated = service
            .replace_winners(result.id, vec![winner("20", 1), winner("30", 2)])
            .await
            .unwrap();
        assert_eq!(updated.winners.len(), 2);
        assert_eq!(updated.winners[0].player_aga_id, "20");
    }

    #[tokio::test]
    async fn test_soft_deleted_result_is_gone() {
        let pool = support::connect().await;
        let event = support::seed_event(&pool, "Congress").await;
        let result = support::seed_result(&pool, event.id, vec![winner("10", 1)]).await;
        let service = ResultService::new(pool.clone());

        service.delete(result.id).await.unwrap();

        let err = service.get(result.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
