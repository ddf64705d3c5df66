use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{DatabaseBackend, Statement};

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    Title,
    StartsAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Players {
    Table,
    Id,
    AgaId,
    Name,
    Email,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Prizes {
    Table,
    Id,
    Title,
    ValueCents,
    Quantity,
    CreatedAt,
    UpdatedAt,
}

/// One row per fulfillable prize unit. A NULL owner means the award is
/// still available for allocation.
#[derive(DeriveIden)]
enum Awards {
    Table,
    Id,
    PrizeId,
    OwnerPlayerId,
    RedeemCode,
    ValueCents,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AwardPreferences {
    Table,
    Id,
    PlayerId,
    AwardId,
    PreferenceOrder,
    CreatedAt,
    UpdatedAt,
}

/// Winners and the committed award snapshot are JSON documents replaced
/// wholesale; the two nullable timestamps carry the allocation state.
#[derive(DeriveIden)]
enum Results {
    Table,
    Id,
    EventId,
    Winners,
    Awards,
    AllocationLockedAt,
    AllocationFinalizedAt,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Events::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Events::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Events::StartsAt).timestamp_with_time_zone().null())
                    .col(
                        ColumnDef::new(Events::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Events::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Players::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Players::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Players::AgaId).string_len(32).not_null())
                    .col(ColumnDef::new(Players::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Players::Email).string_len(255).null())
                    .col(
                        ColumnDef::new(Players::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Players::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // One player record per federation id
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_players_aga_id_unique")
                    .table(Players::Table)
                    .col(Players::AgaId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Prizes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Prizes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Prizes::Title).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Prizes::ValueCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Prizes::Quantity)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Prizes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Prizes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Awards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Awards::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Awards::PrizeId).big_integer().not_null())
                    .col(ColumnDef::new(Awards::OwnerPlayerId).big_integer().null())
                    .col(ColumnDef::new(Awards::RedeemCode).string_len(255).null())
                    .col(
                        ColumnDef::new(Awards::ValueCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Awards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Awards::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_awards_prize")
                            .from(Awards::Table, Awards::PrizeId)
                            .to(Prizes::Table, Prizes::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_awards_owner_player")
                            .from(Awards::Table, Awards::OwnerPlayerId)
                            .to(Players::Table, Players::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_awards_prize")
                    .table(Awards::Table)
                    .col(Awards::PrizeId)
                    .to_owned(),
            )
            .await?;

        // Availability scans filter on the owner column
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_awards_owner_player")
                    .table(Awards::Table)
                    .col(Awards::OwnerPlayerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AwardPreferences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AwardPreferences::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AwardPreferences::PlayerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AwardPreferences::AwardId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AwardPreferences::PreferenceOrder)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AwardPreferences::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(AwardPreferences::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_award_preferences_player")
                            .from(AwardPreferences::Table, AwardPreferences::PlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_award_preferences_award")
                            .from(AwardPreferences::Table, AwardPreferences::AwardId)
                            .to(Awards::Table, Awards::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One preference row per (player, award)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_award_preferences_player_award_unique")
                    .table(AwardPreferences::Table)
                    .col(AwardPreferences::PlayerId)
                    .col(AwardPreferences::AwardId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_award_preferences_player")
                    .table(AwardPreferences::Table)
                    .col(AwardPreferences::PlayerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Results::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Results::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Results::EventId).big_integer().not_null())
                    .col(ColumnDef::new(Results::Winners).json().not_null())
                    .col(ColumnDef::new(Results::Awards).json().not_null())
                    .col(
                        ColumnDef::new(Results::AllocationLockedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Results::AllocationFinalizedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Results::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Results::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Results::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_results_event")
                            .from(Results::Table, Results::EventId)
                            .to(Events::Table, Events::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // One result aggregate per event
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_results_event_unique")
                    .table(Results::Table)
                    .col(Results::EventId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // At most one result may be locked-and-not-finalized at a time.
        // Partial unique index over a constant-true expression: every row
        // matching the predicate collides with every other, so a second
        // unfinalized lock fails with a unique violation inside its own
        // transaction. Expression syntax differs between backends.
        let conn = manager.get_connection();
        let partial_index_sql = match manager.get_database_backend() {
            DatabaseBackend::Postgres => Some(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_results_single_active_lock \
                 ON results ((allocation_locked_at IS NOT NULL)) \
                 WHERE allocation_locked_at IS NOT NULL AND allocation_finalized_at IS NULL",
            ),
            DatabaseBackend::Sqlite => Some(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_results_single_active_lock \
                 ON results (allocation_locked_at IS NOT NULL) \
                 WHERE allocation_locked_at IS NOT NULL AND allocation_finalized_at IS NULL",
            ),
            DatabaseBackend::MySql => None,
        };
        if let Some(sql) = partial_index_sql {
            conn.execute(Statement::from_string(
                manager.get_database_backend(),
                sql.to_string(),
            ))
            .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Results::Table).to_owned())
            .await?;

        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(AwardPreferences::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Awards::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Prizes::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Players::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Events::Table).to_owned())
            .await?;

        Ok(())
    }
}
