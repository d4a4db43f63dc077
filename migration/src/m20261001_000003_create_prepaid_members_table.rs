use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // プリペイド会員（ID: B/D/U + B + 3〜5桁）
        manager
            .create_table(
                Table::create()
                    .table(PrepaidMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PrepaidMembers::Id)
                            .string_len(16)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PrepaidMembers::Name)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrepaidMembers::WashType)
                            .string_len(1)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PrepaidMembers::IssueDate).date())
                    .col(ColumnDef::new(PrepaidMembers::LastVisitDate).date())
                    .col(
                        ColumnDef::new(PrepaidMembers::PrepaidWashes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PrepaidMembers::Notes)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(PrepaidMembers::Email).string_len(255))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PrepaidMembers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PrepaidMembers {
    Table,
    Id,
    Name,
    WashType,
    IssueDate,
    LastVisitDate,
    PrepaidWashes,
    Notes,
    Email,
}
