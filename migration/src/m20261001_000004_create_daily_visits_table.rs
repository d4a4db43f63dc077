use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DailyVisits::Table)
                    .if_not_exists()
                    // "YYYY-MM-DD" 形式の日付キー（UTC）
                    .col(
                        ColumnDef::new(DailyVisits::DateKey)
                            .string_len(10)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DailyVisits::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DailyVisits::Count)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    // カテゴリ別・サービス種別ごとのカウンター
                    .col(ColumnDef::new(DailyVisits::Counters).json().not_null())
                    // 楽観的ロック用のバージョン
                    .col(
                        ColumnDef::new(DailyVisits::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyVisits::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(DailyVisits::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // インデックスを作成（日付範囲検索・古いデータ削除用）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_daily_visits_date")
                    .table(DailyVisits::Table)
                    .col(DailyVisits::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailyVisits::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DailyVisits {
    Table,
    DateKey,
    Date,
    Count,
    Counters,
    Version,
    CreatedAt,
    LastUpdated,
}
