use crate::entities::{award_entity as awards, award_preference_entity as prefs};
use crate::error::{AppError, AppResult};
use crate::models::PreferenceResponse;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::collections::HashSet;

#[derive(Clone)]
pub struct PreferenceService {
    pool: DatabaseConnection,
}

impl PreferenceService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// A player's preferences, most preferred first
    pub async fn list_by_player(&self, player_id: i64) -> AppResult<Vec<PreferenceResponse>> {
        let rows = prefs::Entity::find()
            .filter(prefs::Column::PlayerId.eq(player_id))
            .order_by_asc(prefs::Column::PreferenceOrder)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Replace the player's whole ranking: delete every existing row, then
    /// insert the new ordered set. All-or-nothing; an empty list clears.
    pub async fn replace_all(
        &self,
        player_id: i64,
        ordered_award_ids: &[i64],
    ) -> AppResult<Vec<PreferenceResponse>> {
        let mut seen = HashSet::new();
        for award_id in ordered_award_ids {
            if !seen.insert(*award_id) {
                return Err(AppError::ValidationError(format!(
                    "Award {award_id} appears more than once in the preference list"
                )));
            }
        }

        let txn = self.pool.begin().await?;

        if !ordered_award_ids.is_empty() {
            let known = awards::Entity::find()
                .filter(awards::Column::Id.is_in(ordered_award_ids.iter().copied()))
                .count(&txn)
                .await?;
            if known != ordered_award_ids.len() as u64 {
                return Err(AppError::NotFound(
                    "Preference list references an unknown award".to_string(),
                ));
            }
        }

        prefs::Entity::delete_many()
            .filter(prefs::Column::PlayerId.eq(player_id))
            .exec(&txn)
            .await?;

        if !ordered_award_ids.is_empty() {
            let now = Utc::now();
            let rows: Vec<prefs::ActiveModel> = ordered_award_ids
                .iter()
                .enumerate()
                .map(|(idx, award_id)| prefs::ActiveModel {
                    player_id: Set(player_id),
                    award_id: Set(*award_id),
                    preference_order: Set(idx as i32 + 1),
                    created_at: Set(Some(now)),
                    updated_at: Set(Some(now)),
                    ..Default::default()
                })
                .collect();
            prefs::Entity::insert_many(rows).exec(&txn).await?;
        }

        txn.commit().await?;
        self.list_by_player(player_id).await
    }

    /// Drop every preference row for the player (player removal path)
    pub async fn delete_by_player<C: ConnectionTrait>(
        &self,
        conn: &C,
        player_id: i64,
    ) -> AppResult<()> {
        prefs::Entity::delete_many()
            .filter(prefs::Column::PlayerId.eq(player_id))
            .exec(conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support as support;

    #[tokio::test]
    async fn test_replace_all_is_wholesale() {
        let pool = support::connect().await;
        let player = support::seed_player(&pool, "100", "Alice").await;
        let a = support::seed_award(&pool, "A", 100, None).await;
        let b = support::seed_award(&pool, "B", 200, None).await;
        let c = support::seed_award(&pool, "C", 300, None).await;

        let service = PreferenceService::new(pool.clone());
        service.replace_all(player.id, &[a.id, b.id]).await.unwrap();
        let replaced = service.replace_all(player.id, &[c.id, a.id]).await.unwrap();

        assert_eq!(replaced.len(), 2);
        assert_eq!(replaced[0].award_id, c.id);
        assert_eq!(replaced[0].preference_order, 1);
        assert_eq!(replaced[1].award_id, a.id);
        assert_eq!(replaced[1].preference_order, 2);
    }

    #[tokio::test]
    async fn test_replace_all_rejects_duplicates() {
        let pool = support::connect().await;
        let player = support::seed_player(&pool, "100", "Alice").await;
        let a = support::seed_award(&pool, "A", 100, None).await;

        let service = PreferenceService::new(pool.clone());
        let err = service.replace_all(player.id, &[a.id, a.id]).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_replace_all_rejects_unknown_award() {
        let pool = support::connect().await;
        let player = support::seed_player(&pool, "100", "Alice").await;
        let a = support::seed_award(&pool, "A", 100, None).await;

        let service = PreferenceService::new(pool.clone());
        service.replace_all(player.id, &[a.id]).await.unwrap();

        let err = service
            .replace_all(player.id, &[a.id + 999])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        // The failed call must not have touched existing rows
        let kept = service.list_by_player(player.id).await.unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].award_id, a.id);
    }

    #[tokio::test]
    async fn test_replace_all_empty_clears() {
        let pool = support::connect().await;
        let player = support::seed_player(&pool, "100", "Alice").await;
        let a = support::seed_award(&pool, "A", 100, None).await;

        let service = PreferenceService::new(pool.clone());
        service.replace_all(player.id, &[a.id]).await.unwrap();
        let cleared = service.replace_all(player.id, &[]).await.unwrap();
        assert!(cleared.is_empty());
    }
}
