use crate::entities::{
    award_entity as awards, award_preference_entity as prefs, result_entity as results,
};
use crate::error::{AppError, AppResult};
use crate::models::{AwardQuery, AwardResponse, PaginatedResponse, PaginationParams};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};

/// Outcome of the two-phase best-available lookup.
pub struct BestAvailableAward {
    pub award: awards::Model,
    pub preference_order: Option<i32>,
    pub from_preference: bool,
}

#[derive(Clone)]
pub struct AwardService {
    pool: DatabaseConnection,
}

impl AwardService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// List awards (paginated), optionally filtered by availability
    pub async fn list(&self, query: &AwardQuery) -> AppResult<PaginatedResponse<AwardResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut find = awards::Entity::find();
        if let Some(available) = query.available {
            find = if available {
                find.filter(awards::Column::OwnerPlayerId.is_null())
            } else {
                find.filter(awards::Column::OwnerPlayerId.is_not_null())
            };
        }

        let total = find.clone().count(&self.pool).await? as i64;

        let items = find
            .order_by_asc(awards::Column::Id)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            items.into_iter().map(Into::into).collect(),
            params.get_page(),
            params.get_page_size(),
            total,
        ))
    }

    /// Best available award for a player, two phases inside the caller's
    /// transaction:
    /// 1. the player's declared preferences (ascending order) joined against
    ///    still-available, non-excluded awards; first match wins
    /// 2. otherwise the most valuable available non-excluded award
    /// Preference satisfaction takes strict priority over raw value.
    pub async fn get_best_available_for_player<C: ConnectionTrait>(
        &self,
        conn: &C,
        player_id: i64,
        excluded_award_ids: &[i64],
    ) -> AppResult<Option<BestAvailableAward>> {
        let mut by_preference = prefs::Entity::find()
            .filter(prefs::Column::PlayerId.eq(player_id))
            .find_also_related(awards::Entity)
            .filter(awards::Column::OwnerPlayerId.is_null());
        if !excluded_award_ids.is_empty() {
            by_preference = by_preference
                .filter(awards::Column::Id.is_not_in(excluded_award_ids.iter().copied()));
        }
        let preferred = by_preference
            .order_by_asc(prefs::Column::PreferenceOrder)
            .one(conn)
            .await?;

        if let Some((pref, Some(award))) = preferred {
            return Ok(Some(BestAvailableAward {
                award,
                preference_order: Some(pref.preference_order),
                from_preference: true,
            }));
        }

        let mut fallback = awards::Entity::find().filter(awards::Column::OwnerPlayerId.is_null());
        if !excluded_award_ids.is_empty() {
            fallback =
                fallback.filter(awards::Column::Id.is_not_in(excluded_award_ids.iter().copied()));
        }
        let most_valuable = fallback
            .order_by_desc(awards::Column::ValueCents)
            .order_by_asc(awards::Column::Id)
            .one(conn)
            .await?;

        Ok(most_valuable.map(|award| BestAvailableAward {
            award,
            preference_order: None,
            from_preference: false,
        }))
    }

    /// Assign an award to a player. Conditional on the award still being
    /// available; zero rows affected means it was taken or is gone.
    pub async fn assign_owner<C: ConnectionTrait>(
        &self,
        conn: &C,
        award_id: i64,
        player_id: i64,
    ) -> AppResult<()> {
        let update = awards::Entity::update_many()
            .col_expr(awards::Column::OwnerPlayerId, Expr::value(Some(player_id)))
            .col_expr(awards::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(awards::Column::Id.eq(award_id))
            .filter(awards::Column::OwnerPlayerId.is_null())
            .exec(conn)
            .await?;

        if update.rows_affected == 0 {
            return Err(AppError::ValidationError(format!(
                "Award {award_id} is not available for assignment"
            )));
        }
        Ok(())
    }

    /// Release an award back to the pool. A missing row is a logged no-op
    /// so deallocation stays idempotent.
    pub async fn clear_owner<C: ConnectionTrait>(&self, conn: &C, award_id: i64) -> AppResult<()> {
        let update = awards::Entity::update_many()
            .col_expr(awards::Column::OwnerPlayerId, Expr::value(Option::<i64>::None))
            .col_expr(awards::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(awards::Column::Id.eq(award_id))
            .exec(conn)
            .await?;

        if update.rows_affected == 0 {
            log::warn!("Award {award_id} no longer exists; skipping owner reset");
        }
        Ok(())
    }

    /// Hard delete, blocked while the award is assigned or referenced by a
    /// finalized result snapshot (history must survive).
    pub async fn delete(&self, award_id: i64) -> AppResult<()> {
        let txn = self.pool.begin().await?;

        let award = awards::Entity::find_by_id(award_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Award {award_id} not found")))?;

        if award.owner_player_id.is_some() {
            return Err(AppError::ValidationError(format!(
                "Award {award_id} is assigned and cannot be deleted"
            )));
        }

        let finalized = results::Entity::find()
            .filter(results::Column::AllocationFinalizedAt.is_not_null())
            .filter(results::Column::DeletedAt.is_null())
            .all(&txn)
            .await?;
        let referenced = finalized
            .iter()
            .any(|r| r.awards.0.iter().any(|a| a.award_id == Some(award_id)));
        if referenced {
            return Err(AppError::ValidationError(format!(
                "Award {award_id} is referenced by a finalized result and cannot be deleted"
            )));
        }

        awards::Entity::delete_by_id(award_id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }
}
