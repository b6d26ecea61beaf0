// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 创建 `scans` 表
///
/// 每一行代表对某个域名的一次扫描，写入后不再修改。
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Scans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Scans::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Scans::DomainName).string().not_null())
                    .col(ColumnDef::new(Scans::ScanDate).date().not_null())
                    .to_owned(),
            )
            .await?;

        // The read side filters by domain and orders by date
        manager
            .create_index(
                Index::create()
                    .name("idx_scans_domain_date")
                    .table(Scans::Table)
                    .if_not_exists()
                    .col(Scans::DomainName)
                    .col(Scans::ScanDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Scans::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Scans {
    Table,
    Id,
    DomainName,
    ScanDate,
}
