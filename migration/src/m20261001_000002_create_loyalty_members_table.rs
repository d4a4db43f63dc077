use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ロイヤルティ会員（ID: L + 3〜5桁）
        manager
            .create_table(
                Table::create()
                    .table(LoyaltyMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LoyaltyMembers::Id)
                            .string_len(16)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyMembers::Name)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(LoyaltyMembers::IssueDate).date())
                    .col(ColumnDef::new(LoyaltyMembers::LastVisitDate).date())
                    .col(
                        ColumnDef::new(LoyaltyMembers::VisitCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LoyaltyMembers::Notes)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(LoyaltyMembers::Email).string_len(255))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LoyaltyMembers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LoyaltyMembers {
    Table,
    Id,
    Name,
    IssueDate,
    LastVisitDate,
    VisitCount,
    Notes,
    Email,
}
