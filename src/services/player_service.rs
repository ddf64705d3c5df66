use crate::entities::{award_entity as awards, player_entity as players};
use crate::error::{AppError, AppResult};
use crate::models::{CreatePlayerRequest, PlayerResponse};
use crate::services::PreferenceService;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, SqlErr, TransactionTrait,
};

#[derive(Clone)]
pub struct PlayerService {
    pool: DatabaseConnection,
    preference_service: PreferenceService,
}

impl PlayerService {
    pub fn new(pool: DatabaseConnection, preference_service: PreferenceService) -> Self {
        Self {
            pool,
            preference_service,
        }
    }

    pub async fn create(&self, req: &CreatePlayerRequest) -> AppResult<PlayerResponse> {
        if req.aga_id.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Federation id must not be empty".to_string(),
            ));
        }
        if req.name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Player name must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let insert = players::ActiveModel {
            aga_id: Set(req.aga_id.trim().to_string()),
            name: Set(req.name.trim().to_string()),
            email: Set(req.email.clone()),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&self.pool)
        .await;

        match insert {
            Ok(player) => Ok(player.into()),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(AppError::Conflict(format!(
                    "A player with federation id {} already exists",
                    req.aga_id.trim()
                ))),
                _ => Err(e.into()),
            },
        }
    }

    pub async fn get(&self, player_id: i64) -> AppResult<PlayerResponse> {
        let player = players::Entity::find_by_id(player_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Player {player_id} not found")))?;
        Ok(player.into())
    }

    /// Remove a player and their preferences. Blocked while the player
    /// holds any award.
    pub async fn delete(&self, player_id: i64) -> AppResult<()> {
        let txn = self.pool.begin().await?;

        let player = players::Entity::find_by_id(player_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Player {player_id} not found")))?;

        let owned = awards::Entity::find()
            .filter(awards::Column::OwnerPlayerId.eq(player.id))
            .count(&txn)
            .await?;
        if owned > 0 {
            return Err(AppError::ValidationError(format!(
                "Player {player_id} holds {owned} award(s); deallocate before deleting"
            )));
        }

        self.preference_service.delete_by_player(&txn, player.id).await?;
        players::Entity::delete_by_id(player.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support as support;

    fn service(pool: &DatabaseConnection) -> PlayerService {
        PlayerService::new(pool.clone(), PreferenceService::new(pool.clone()))
    }

    #[tokio::test]
    async fn test_duplicate_federation_id_conflicts() {
        let pool = support::connect().await;
        let svc = service(&pool);

        let req = CreatePlayerRequest {
            aga_id: "12345".to_string(),
            name: "Alice".to_string(),
            email: None,
        };
        svc.create(&req).await.unwrap();

        let err = svc.create(&req).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_preferences() {
        let pool = support::connect().await;
        let svc = service(&pool);
        let prefs_svc = PreferenceService::new(pool.clone());

        let player = support::seed_player(&pool, "100", "Alice").await;
        let award = support::seed_award(&pool, "A", 100, None).await;
        prefs_svc.replace_all(player.id, &[award.id]).await.unwrap();

        svc.delete(player.id).await.unwrap();

        assert!(matches!(
            svc.get(player.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(prefs_svc.list_by_player(player.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_blocked_while_holding_awards() {
        let pool = support::connect().await;
        let svc = service(&pool);

        let player = support::seed_player(&pool, "100", "Alice").await;
        let award = support::seed_award(&pool, "A", 100, None).await;
        crate::services::AwardService::new(pool.clone())
            .assign_owner(&pool, award.id, player.id)
            .await
            .unwrap();

        let err = svc.delete(player.id).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
