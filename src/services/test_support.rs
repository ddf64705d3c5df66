//! Shared fixtures for the service tests: an in-memory SQLite database with
//! the real migrations applied, plus small seeding helpers.

use crate::entities::{
    AllocationKind, ResultAward, ResultAwardList, Winner, WinnerList,
    award_entity as awards, award_preference_entity as prefs, event_entity as events,
    player_entity as players, prize_entity as prizes, result_entity as results,
};
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, Set,
};

pub async fn connect() -> DatabaseConnection {
    // A single connection keeps the in-memory database alive and shared
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1).sqlx_logging(false);
    let pool = Database::connect(options).await.expect("sqlite connect");
    Migrator::up(&pool, None).await.expect("migrations");
    pool
}

pub async fn seed_event(pool: &DatabaseConnection, title: &str) -> events::Model {
    events::ActiveModel {
        title: Set(title.to_string()),
        created_at: Set(Some(Utc::now())),
        updated_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(pool)
    .await
    .expect("insert event")
}

pub async fn seed_player(pool: &DatabaseConnection, aga_id: &str, name: &str) -> players::Model {
    players::ActiveModel {
        aga_id: Set(aga_id.to_string()),
        name: Set(name.to_string()),
        created_at: Set(Some(Utc::now())),
        updated_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(pool)
    .await
    .expect("insert player")
}

/// A prize listing with a single award unit; returns the award row.
pub async fn seed_award(
    pool: &DatabaseConnection,
    title: &str,
    value_cents: i64,
    redeem_code: Option<&str>,
) -> awards::Model {
    let prize = prizes::ActiveModel {
        title: Set(title.to_string()),
        value_cents: Set(value_cents),
        quantity: Set(1),
        created_at: Set(Some(Utc::now())),
        updated_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(pool)
    .await
    .expect("insert prize");

    awards::ActiveModel {
        prize_id: Set(prize.id),
        value_cents: Set(value_cents),
        redeem_code: Set(redeem_code.map(|c| c.to_string())),
        created_at: Set(Some(Utc::now())),
        updated_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(pool)
    .await
    .expect("insert award")
}

pub async fn seed_preference(
    pool: &DatabaseConnection,
    player_id: i64,
    award_id: i64,
    preference_order: i32,
) -> prefs::Model {
    prefs::ActiveModel {
        player_id: Set(player_id),
        award_id: Set(award_id),
        preference_order: Set(preference_order),
        created_at: Set(Some(Utc::now())),
        updated_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(pool)
    .await
    .expect("insert preference")
}

pub async fn seed_result(
    pool: &DatabaseConnection,
    event_id: i64,
    winners: Vec<Winner>,
) -> results::Model {
    results::ActiveModel {
        event_id: Set(event_id),
        winners: Set(WinnerList(winners)),
        awards: Set(ResultAwardList::default()),
        created_at: Set(Some(Utc::now())),
        updated_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(pool)
    .await
    .expect("insert result")
}

pub async fn award_owner(pool: &DatabaseConnection, award_id: i64) -> Option<i64> {
    awards::Entity::find_by_id(award_id)
        .one(pool)
        .await
        .expect("load award")
        .expect("award exists")
        .owner_player_id
}

/// A hand-built submission entry, for tests that bypass the recommender.
pub fn result_award(
    player: &players::Model,
    award_id: i64,
    prize_title: &str,
    event_title: &str,
) -> ResultAward {
    ResultAward {
        player_id: player.id,
        player_name: player.name.clone(),
        player_aga_id: player.aga_id.clone(),
        place: 1,
        division: "DAN".to_string(),
        prize_title: prize_title.to_string(),
        award_id: Some(award_id),
        award_value_cents: 0,
        award_redeem_code: None,
        user_email: player.email.clone(),
        award_at: Utc::now(),
        event_title: event_title.to_string(),
        award_preference_order: None,
        allocation_kind: AllocationKind::Default,
    }
}
