use crate::entities::{award_entity as awards, prize_entity as prizes};
use crate::error::{AppError, AppResult};
use crate::models::{CreatePrizeRequest, PrizeResponse};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set, TransactionTrait,
};

#[derive(Clone)]
pub struct PrizeService {
    pool: DatabaseConnection,
}

impl PrizeService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Create a prize listing and fan out one award row per unit, all in
    /// one transaction.
    pub async fn create(&self, req: &CreatePrizeRequest) -> AppResult<PrizeResponse> {
        if req.title.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Prize title must not be empty".to_string(),
            ));
        }
        if req.value_cents < 0 {
            return Err(AppError::ValidationError(
                "Prize value must not be negative".to_string(),
            ));
        }
        if req.quantity < 1 {
            return Err(AppError::ValidationError(
                "Prize quantity must be at least 1".to_string(),
            ));
        }
        if let Some(codes) = &req.redeem_codes {
            if codes.len() != req.quantity as usize {
                return Err(AppError::ValidationError(format!(
                    "Expected {} redeem code(s), got {}",
                    req.quantity,
                    codes.len()
                )));
            }
        }

        let txn = self.pool.begin().await?;
        let now = Utc::now();

        let prize = prizes::ActiveModel {
            title: Set(req.title.trim().to_string()),
            value_cents: Set(req.value_cents),
            quantity: Set(req.quantity),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let units: Vec<awards::ActiveModel> = (0..req.quantity as usize)
            .map(|idx| awards::ActiveModel {
                prize_id: Set(prize.id),
                value_cents: Set(req.value_cents),
                redeem_code: Set(req
                    .redeem_codes
                    .as_ref()
                    .map(|codes| codes[idx].clone())),
                created_at: Set(Some(now)),
                updated_at: Set(Some(now)),
                ..Default::default()
            })
            .collect();
        awards::Entity::insert_many(units).exec(&txn).await?;

        txn.commit().await?;

        log::info!(
            "Created prize '{}' with {} award unit(s)",
            prize.title,
            prize.quantity
        );
        Ok(prize.into())
    }

    pub async fn list(&self) -> AppResult<Vec<PrizeResponse>> {
        let rows = prizes::Entity::find()
            .order_by_asc(prizes::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AwardQuery;
    use crate::services::{AwardService, test_support as support};

    #[tokio::test]
    async fn test_create_fans_out_award_units() {
        let pool = support::connect().await;
        let service = PrizeService::new(pool.clone());

        let prize = service
            .create(&CreatePrizeRequest {
                title: "Go Book Collection".to_string(),
                value_cents: 2500,
                quantity: 3,
                redeem_codes: None,
            })
            .await
            .unwrap();
        assert_eq!(prize.quantity, 3);

        let listed = AwardService::new(pool.clone())
            .list(&AwardQuery {
                page: None,
                per_page: None,
                available: Some(true),
            })
            .await
            .unwrap();
        assert_eq!(listed.total, 3);
        assert!(listed.data.iter().all(|a| a.prize_id == prize.id));
        assert!(listed.data.iter().all(|a| a.value_cents == 2500));
    }

    #[tokio::test]
    async fn test_redeem_code_count_must_match_quantity() {
        let pool = support::connect().await;
        let service = PrizeService::new(pool.clone());

        let err = service
            .create(&CreatePrizeRequest {
                title: "Voucher".to_string(),
                value_cents: 1000,
                quantity: 2,
                redeem_codes: Some(vec!["ONLY-ONE".to_string()]),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
