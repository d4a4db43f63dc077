// migration/src/lib.rs
pub use sea_orm_migration::prelude::*;

// 会員関連マイグレーション
mod m20261001_000001_create_members_table;
mod m20261001_000002_create_loyalty_members_table;
mod m20261001_000003_create_prepaid_members_table;

// 来店集計マイグレーション
mod m20261001_000004_create_daily_visits_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_members_table::Migration),
            Box::new(m20261001_000002_create_loyalty_members_table::Migration),
            Box::new(m20261001_000003_create_prepaid_members_table::Migration),
            Box::new(m20261001_000004_create_daily_visits_table::Migration),
        ]
    }
}
