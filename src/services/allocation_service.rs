use crate::entities::{
    AllocationKind, AllocationState, ResultAward, ResultAwardList, event_entity as events,
    player_entity as players, prize_entity as prizes, result_entity as results,
};
use crate::error::{AppError, AppResult};
use crate::models::{AllocationProposalResponse, ResultResponse};
use crate::services::AwardService;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, Set, SqlErr, TransactionTrait,
};

/// Drop entries the operator cleared (null award id) before committing.
fn retain_committed(submitted: Vec<ResultAward>) -> Vec<ResultAward> {
    submitted
        .into_iter()
        .filter(|entry| entry.award_id.is_some())
        .collect()
}

/// Orchestrates the allocation workflow for one result: acquire the
/// system-wide allocation lock, run the recommendation pass, and commit or
/// revert assignments. All three entry points run inside one transaction
/// each; nothing partial is ever observable.
#[derive(Clone)]
pub struct AllocationService {
    pool: DatabaseConnection,
    award_service: AwardService,
}

impl AllocationService {
    pub fn new(pool: DatabaseConnection, award_service: AwardService) -> Self {
        Self {
            pool,
            award_service,
        }
    }

    /// Lock the result and compute award recommendations for its winners.
    ///
    /// Only the lock timestamp is persisted; the proposal set is returned to
    /// the operator for review and resubmission via finalize. Any failure
    /// rolls the transaction back, so a failed pass leaves no lock behind.
    pub async fn get_recommendations(
        &self,
        result_id: i64,
    ) -> AppResult<AllocationProposalResponse> {
        let txn = self.pool.begin().await?;

        let result = Self::find_result(&txn, result_id).await?;
        if result.allocation_state() == AllocationState::Finalized {
            return Err(AppError::ValidationError(format!(
                "Result {result_id} is already finalized; deallocate before regenerating"
            )));
        }

        if Self::has_active_lock_elsewhere(&txn, result_id).await? {
            return Err(AppError::Conflict(
                "Another result is currently mid-allocation".to_string(),
            ));
        }

        let event = events::Entity::find_by_id(result.event_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", result.event_id)))?;

        let locked = Self::set_lock(&txn, result).await?;
        let recommendations = self.recommend(&txn, &locked, &event).await?;

        txn.commit().await?;

        log::info!(
            "Generated {} award recommendation(s) for result {result_id}",
            recommendations.len()
        );

        Ok(AllocationProposalResponse {
            recommendations,
            locked: true,
            finalized: false,
        })
    }

    /// Commit the operator-reviewed award list onto the result.
    pub async fn finalize(
        &self,
        result_id: i64,
        submitted: Vec<ResultAward>,
    ) -> AppResult<ResultResponse> {
        let txn = self.pool.begin().await?;

        let result = Self::find_result(&txn, result_id).await?;
        match result.allocation_state() {
            AllocationState::Locked => {}
            AllocationState::Initial => {
                return Err(AppError::ValidationError(format!(
                    "Result {result_id} holds no allocation lock"
                )));
            }
            AllocationState::Finalized => {
                return Err(AppError::ValidationError(format!(
                    "Result {result_id} is already finalized"
                )));
            }
        }

        let committed = retain_committed(submitted);
        if committed.is_empty() {
            return Err(AppError::ValidationError(
                "Awards list is empty after removing cleared entries".to_string(),
            ));
        }

        // Release anything still snapshotted from a prior commit before
        // assigning the new set.
        for prior in &result.awards.0 {
            if let Some(award_id) = prior.award_id {
                self.award_service.clear_owner(&txn, award_id).await?;
            }
        }

        for entry in &committed {
            if let Some(award_id) = entry.award_id {
                self.award_service
                    .assign_owner(&txn, award_id, entry.player_id)
                    .await?;
            }
        }

        let now = Utc::now();
        let mut am = result.into_active_model();
        am.awards = Set(ResultAwardList(committed));
        am.allocation_finalized_at = Set(Some(now));
        am.updated_at = Set(Some(now));
        let updated = am.update(&txn).await?;

        txn.commit().await?;

        log::info!(
            "Finalized {} award(s) for result {result_id}",
            updated.awards.0.len()
        );

        Ok(updated.into())
    }

    /// Undo any committed allocation and release the lock. Safe to call in
    /// any state; on an untouched result it is a no-op.
    pub async fn deallocate(&self, result_id: i64) -> AppResult<AllocationProposalResponse> {
        let txn = self.pool.begin().await?;

        let result = Self::find_result(&txn, result_id).await?;

        for entry in &result.awards.0 {
            if let Some(award_id) = entry.award_id {
                self.award_service.clear_owner(&txn, award_id).await?;
            }
        }

        let mut am = result.into_active_model();
        am.awards = Set(ResultAwardList::default());
        am.allocation_locked_at = Set(None);
        am.allocation_finalized_at = Set(None);
        am.updated_at = Set(Some(Utc::now()));
        am.update(&txn).await?;

        txn.commit().await?;

        log::info!("Deallocated awards for result {result_id}");

        Ok(AllocationProposalResponse {
            recommendations: Vec::new(),
            locked: false,
            finalized: false,
        })
    }

    // -----------------------------
    // Lock management
    // -----------------------------

    /// True when any other result is locked without being finalized; that is
    /// the only state counting toward system-wide exclusivity.
    async fn has_active_lock_elsewhere(
        txn: &DatabaseTransaction,
        result_id: i64,
    ) -> AppResult<bool> {
        let count = results::Entity::find()
            .filter(results::Column::Id.ne(result_id))
            .filter(results::Column::AllocationLockedAt.is_not_null())
            .filter(results::Column::AllocationFinalizedAt.is_null())
            .count(txn)
            .await?;
        Ok(count > 0)
    }

    /// Stamp the lock on the result. The check in the caller and this write
    /// share the transaction; the partial unique index over
    /// locked-and-not-finalized rows turns a lost race into a unique
    /// violation, surfaced as a conflict.
    async fn set_lock(
        txn: &DatabaseTransaction,
        result: results::Model,
    ) -> AppResult<results::Model> {
        let now = Utc::now();
        let mut am = result.into_active_model();
        am.allocation_locked_at = Set(Some(now));
        am.updated_at = Set(Some(now));
        match am.update(txn).await {
            Ok(locked) => Ok(locked),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(AppError::Conflict(
                    "Another result is currently mid-allocation".to_string(),
                )),
                _ => Err(e.into()),
            },
        }
    }

    // -----------------------------
    // Recommendation pass
    // -----------------------------

    /// Greedy first-fit pass over the winners in declared order: each winner
    /// takes their best available award, which is then excluded for the rest
    /// of the pass. Earlier winners pick first; no backtracking.
    async fn recommend(
        &self,
        txn: &DatabaseTransaction,
        result: &results::Model,
        event: &events::Model,
    ) -> AppResult<Vec<ResultAward>> {
        let mut recommendations = Vec::with_capacity(result.winners.0.len());
        let mut taken: Vec<i64> = Vec::new();

        for winner in &result.winners.0 {
            // An unresolvable winner is a data integrity problem; it aborts
            // the whole pass rather than being skipped.
            let player = players::Entity::find()
                .filter(players::Column::AgaId.eq(winner.player_aga_id.as_str()))
                .one(txn)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "No player found for federation id {}",
                        winner.player_aga_id
                    ))
                })?;

            let Some(best) = self
                .award_service
                .get_best_available_for_player(txn, player.id, &taken)
                .await?
            else {
                // Running out of awards is an availability gap, not an error
                log::warn!(
                    "No award left for player {} (division {}, place {}); skipping",
                    player.aga_id,
                    winner.division,
                    winner.place
                );
                continue;
            };

            let prize = prizes::Entity::find_by_id(best.award.prize_id)
                .one(txn)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Prize {} not found", best.award.prize_id))
                })?;

            taken.push(best.award.id);
            recommendations.push(ResultAward {
                player_id: player.id,
                player_name: player.name,
                player_aga_id: player.aga_id,
                place: winner.place,
                division: winner.division.clone(),
                prize_title: prize.title,
                award_id: Some(best.award.id),
                award_value_cents: best.award.value_cents,
                award_redeem_code: best.award.redeem_code,
                user_email: player.email,
                award_at: Utc::now(),
                event_title: event.title.clone(),
                award_preference_order: best.preference_order,
                allocation_kind: if best.from_preference {
                    AllocationKind::Preference
                } else {
                    AllocationKind::Default
                },
            });
        }

        Ok(recommendations)
    }

    async fn find_result(
        txn: &DatabaseTransaction,
        result_id: i64,
    ) -> AppResult<results::Model> {
        results::Entity::find_by_id(result_id)
            .filter(results::Column::DeletedAt.is_null())
            .one(txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Result {result_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Winner;
    use crate::services::test_support as support;

    fn service(pool: &DatabaseConnection) -> AllocationService {
        AllocationService::new(pool.clone(), AwardService::new(pool.clone()))
    }

    fn winner(division: &str, aga_id: &str, place: i32) -> Winner {
        Winner {
            division: division.to_string(),
            player_aga_id: aga_id.to_string(),
            place,
        }
    }

    async fn reload(pool: &DatabaseConnection, result_id: i64) -> results::Model {
        results::Entity::find_by_id(result_id)
            .one(pool)
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_preference_then_value_fallback_scenario() {
        let pool = support::connect().await;
        let event = support::seed_event(&pool, "Open Congress").await;
        let p1 = support::seed_player(&pool, "P1", "Alice").await;
        support::seed_player(&pool, "P2", "Bob").await;
        let a10 = support::seed_award(&pool, "Go Book Collection", 2500, None).await;
        let a11 = support::seed_award(&pool, "Teaching Session", 4000, None).await;
        support::seed_preference(&pool, p1.id, a10.id, 1).await;
        let result = support::seed_result(
            &pool,
            event.id,
            vec![winner("DAN", "P1", 1), winner("SDK", "P2", 1)],
        )
        .await;

        let proposal = service(&pool).get_recommendations(result.id).await.unwrap();

        assert!(proposal.locked);
        assert!(!proposal.finalized);
        assert_eq!(proposal.recommendations.len(), 2);

        let first = &proposal.recommendations[0];
        assert_eq!(first.award_id, Some(a10.id));
        assert_eq!(first.allocation_kind, AllocationKind::Preference);
        assert_eq!(first.award_preference_order, Some(1));
        assert_eq!(first.event_title, "Open Congress");
        assert_eq!(first.prize_title, "Go Book Collection");

        let second = &proposal.recommendations[1];
        assert_eq!(second.award_id, Some(a11.id));
        assert_eq!(second.allocation_kind, AllocationKind::Default);
        assert_eq!(second.award_preference_order, None);

        // Proposals are client-side; only the lock is persisted
        let stored = reload(&pool, result.id).await;
        assert_eq!(stored.allocation_state(), AllocationState::Locked);
        assert!(stored.awards.0.is_empty());
    }

    #[tokio::test]
    async fn test_pass_local_exclusion_on_shared_preference() {
        let pool = support::connect().await;
        let event = support::seed_event(&pool, "Congress").await;
        let p1 = support::seed_player(&pool, "P1", "Alice").await;
        let p2 = support::seed_player(&pool, "P2", "Bob").await;
        let contested = support::seed_award(&pool, "Contested", 1000, None).await;
        let fallback = support::seed_award(&pool, "Fallback", 5000, None).await;
        support::seed_preference(&pool, p1.id, contested.id, 1).await;
        support::seed_preference(&pool, p2.id, contested.id, 1).await;
        let result = support::seed_result(
            &pool,
            event.id,
            vec![winner("DAN", "P1", 1), winner("DAN", "P2", 2)],
        )
        .await;

        let proposal = service(&pool).get_recommendations(result.id).await.unwrap();

        assert_eq!(proposal.recommendations.len(), 2);
        // First in declared order wins the contested award
        assert_eq!(proposal.recommendations[0].award_id, Some(contested.id));
        assert_eq!(
            proposal.recommendations[0].allocation_kind,
            AllocationKind::Preference
        );
        assert_eq!(proposal.recommendations[1].award_id, Some(fallback.id));
        assert_eq!(
            proposal.recommendations[1].allocation_kind,
            AllocationKind::Default
        );
    }

    #[tokio::test]
    async fn test_award_shortage_skips_later_winners() {
        let pool = support::connect().await;
        let event = support::seed_event(&pool, "Congress").await;
        support::seed_player(&pool, "P1", "Alice").await;
        support::seed_player(&pool, "P2", "Bob").await;
        let only = support::seed_award(&pool, "Only", 1000, None).await;
        let result = support::seed_result(
            &pool,
            event.id,
            vec![winner("DAN", "P1", 1), winner("SDK", "P2", 1)],
        )
        .await;

        let proposal = service(&pool).get_recommendations(result.id).await.unwrap();

        assert_eq!(proposal.recommendations.len(), 1);
        assert_eq!(proposal.recommendations[0].player_aga_id, "P1");
        assert_eq!(proposal.recommendations[0].award_id, Some(only.id));
    }

    #[tokio::test]
    async fn test_unknown_winner_aborts_and_rolls_back_lock() {
        let pool = support::connect().await;
        let event = support::seed_event(&pool, "Congress").await;
        support::seed_player(&pool, "P1", "Alice").await;
        support::seed_award(&pool, "Only", 1000, None).await;
        let result = support::seed_result(
            &pool,
            event.id,
            vec![winner("DAN", "P1", 1), winner("SDK", "GHOST", 1)],
        )
        .await;

        let err = service(&pool)
            .get_recommendations(result.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        // The failed pass must not leave the lock behind
        let stored = reload(&pool, result.id).await;
        assert_eq!(stored.allocation_state(), AllocationState::Initial);
    }

    #[tokio::test]
    async fn test_lock_is_exclusive_across_results() {
        let pool = support::connect().await;
        let event_a = support::seed_event(&pool, "Congress A").await;
        let event_b = support::seed_event(&pool, "Congress B").await;
        support::seed_player(&pool, "P1", "Alice").await;
        support::seed_award(&pool, "Only", 1000, None).await;
        let result_a =
            support::seed_result(&pool, event_a.id, vec![winner("DAN", "P1", 1)]).await;
        let result_b =
            support::seed_result(&pool, event_b.id, vec![winner("DAN", "P1", 1)]).await;

        let svc = service(&pool);
        svc.get_recommendations(result_a.id).await.unwrap();

        let err = svc.get_recommendations(result_b.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Releasing the lock lets the other result proceed
        svc.deallocate(result_a.id).await.unwrap();
        svc.get_recommendations(result_b.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_relock_same_result_is_allowed() {
        let pool = support::connect().await;
        let event = support::seed_event(&pool, "Congress").await;
        support::seed_player(&pool, "P1", "Alice").await;
        support::seed_award(&pool, "Only", 1000, None).await;
        let result = support::seed_result(&pool, event.id, vec![winner("DAN", "P1", 1)]).await;

        let svc = service(&pool);
        svc.get_recommendations(result.id).await.unwrap();
        // Regenerating for the same result does not conflict with itself
        let proposal = svc.get_recommendations(result.id).await.unwrap();
        assert_eq!(proposal.recommendations.len(), 1);
    }

    #[tokio::test]
    async fn test_finalize_then_deallocate_resets_everything() {
        let pool = support::connect().await;
        let event = support::seed_event(&pool, "Congress").await;
        let p1 = support::seed_player(&pool, "P1", "Alice").await;
        let p2 = support::seed_player(&pool, "P2", "Bob").await;
        let a1 = support::seed_award(&pool, "First", 4000, None).await;
        let a2 = support::seed_award(&pool, "Second", 2000, None).await;
        let result = support::seed_result(
            &pool,
            event.id,
            vec![winner("DAN", "P1", 1), winner("SDK", "P2", 1)],
        )
        .await;

        let svc = service(&pool);
        let proposal = svc.get_recommendations(result.id).await.unwrap();
        let finalized = svc
            .finalize(result.id, proposal.recommendations)
            .await
            .unwrap();

        assert!(finalized.finalized);
        assert_eq!(finalized.allocation_state, AllocationState::Finalized);
        assert_eq!(finalized.awards.len(), 2);

        let owned_a1 = support::award_owner(&pool, a1.id).await;
        let owned_a2 = support::award_owner(&pool, a2.id).await;
        assert_eq!(owned_a1, Some(p1.id));
        assert_eq!(owned_a2, Some(p2.id));

        let cleared = svc.deallocate(result.id).await.unwrap();
        assert!(!cleared.locked);
        assert!(!cleared.finalized);

        assert_eq!(support::award_owner(&pool, a1.id).await, None);
        assert_eq!(support::award_owner(&pool, a2.id).await, None);
        let stored = reload(&pool, result.id).await;
        assert_eq!(stored.allocation_state(), AllocationState::Initial);
        assert!(stored.awards.0.is_empty());
    }

    #[tokio::test]
    async fn test_finalize_honors_operator_override_and_cleared_entries() {
        let pool = support::connect().await;
        let event = support::seed_event(&pool, "Congress").await;
        let p1 = support::seed_player(&pool, "P1", "Alice").await;
        support::seed_player(&pool, "P2", "Bob").await;
        let a1 = support::seed_award(&pool, "First", 4000, None).await;
        let a2 = support::seed_award(&pool, "Second", 2000, None).await;
        let result = support::seed_result(
            &pool,
            event.id,
            vec![winner("DAN", "P1", 1), winner("SDK", "P2", 1)],
        )
        .await;

        let svc = service(&pool);
        let proposal = svc.get_recommendations(result.id).await.unwrap();
        let mut edited = proposal.recommendations;
        // Operator swaps P1 onto the second award and clears P2's entry
        edited[0].award_id = Some(a2.id);
        edited[0].allocation_kind = AllocationKind::Override;
        edited[1].award_id = None;

        let finalized = svc.finalize(result.id, edited).await.unwrap();

        assert_eq!(finalized.awards.len(), 1);
        assert_eq!(finalized.awards[0].award_id, Some(a2.id));
        assert_eq!(finalized.awards[0].allocation_kind, AllocationKind::Override);
        assert_eq!(support::award_owner(&pool, a2.id).await, Some(p1.id));
        assert_eq!(support::award_owner(&pool, a1.id).await, None);
    }

    #[tokio::test]
    async fn test_finalize_rejects_empty_submission_without_mutation() {
        let pool = support::connect().await;
        let event = support::seed_event(&pool, "Congress").await;
        support::seed_player(&pool, "P1", "Alice").await;
        let a1 = support::seed_award(&pool, "Only", 1000, None).await;
        let result = support::seed_result(&pool, event.id, vec![winner("DAN", "P1", 1)]).await;

        let svc = service(&pool);
        let proposal = svc.get_recommendations(result.id).await.unwrap();
        let mut cleared = proposal.recommendations;
        cleared[0].award_id = None;

        let err = svc.finalize(result.id, cleared).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        // No mutation happened: the award is untouched and the result is
        // still just locked
        assert_eq!(support::award_owner(&pool, a1.id).await, None);
        let stored = reload(&pool, result.id).await;
        assert_eq!(stored.allocation_state(), AllocationState::Locked);
        assert!(stored.awards.0.is_empty());
    }

    #[tokio::test]
    async fn test_finalize_requires_lock() {
        let pool = support::connect().await;
        let event = support::seed_event(&pool, "Congress").await;
        let p1 = support::seed_player(&pool, "P1", "Alice").await;
        let a1 = support::seed_award(&pool, "Only", 1000, None).await;
        let result = support::seed_result(&pool, event.id, vec![winner("DAN", "P1", 1)]).await;

        let submission = vec![support::result_award(&p1, a1.id, "Only", "Congress")];
        let err = service(&pool)
            .finalize(result.id, submission)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_refinalize_is_rejected() {
        let pool = support::connect().await;
        let event = support::seed_event(&pool, "Congress").await;
        support::seed_player(&pool, "P1", "Alice").await;
        support::seed_award(&pool, "Only", 1000, None).await;
        let result = support::seed_result(&pool, event.id, vec![winner("DAN", "P1", 1)]).await;

        let svc = service(&pool);
        let proposal = svc.get_recommendations(result.id).await.unwrap();
        svc.finalize(result.id, proposal.recommendations.clone())
            .await
            .unwrap();

        let err = svc
            .finalize(result.id, proposal.recommendations)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = svc.get_recommendations(result.id).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_finalized_result_does_not_block_other_results() {
        let pool = support::connect().await;
        let event_a = support::seed_event(&pool, "Congress A").await;
        let event_b = support::seed_event(&pool, "Congress B").await;
        support::seed_player(&pool, "P1", "Alice").await;
        support::seed_award(&pool, "First", 1000, None).await;
        support::seed_award(&pool, "Second", 2000, None).await;
        let result_a =
            support::seed_result(&pool, event_a.id, vec![winner("DAN", "P1", 1)]).await;
        let result_b =
            support::seed_result(&pool, event_b.id, vec![winner("DAN", "P1", 1)]).await;

        let svc = service(&pool);
        let proposal = svc.get_recommendations(result_a.id).await.unwrap();
        svc.finalize(result_a.id, proposal.recommendations)
            .await
            .unwrap();

        // Finalized-but-locked no longer counts toward exclusivity
        svc.get_recommendations(result_b.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_deallocate_is_idempotent() {
        let pool = support::connect().await;
        let event = support::seed_event(&pool, "Congress").await;
        let result = support::seed_result(&pool, event.id, vec![]).await;

        let svc = service(&pool);
        let first = svc.deallocate(result.id).await.unwrap();
        let second = svc.deallocate(result.id).await.unwrap();

        assert!(first.recommendations.is_empty());
        assert!(!second.locked);
        let stored = reload(&pool, result.id).await;
        assert_eq!(stored.allocation_state(), AllocationState::Initial);
    }

    #[test]
    fn test_retain_committed_drops_cleared_entries() {
        let p = players::Model {
            id: 7,
            aga_id: "P7".to_string(),
            name: "Alice".to_string(),
            email: None,
            created_at: None,
            updated_at: None,
        };
        let kept = support::result_award(&p, 11, "Prize", "Event");
        let mut cleared = kept.clone();
        cleared.award_id = None;

        let committed = retain_committed(vec![cleared, kept.clone()]);
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].award_id, Some(11));

        assert!(retain_committed(vec![]).is_empty());
    }
}
