// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::m20251001_000001_create_scans::Scans;
use sea_orm_migration::prelude::*;

/// 创建 `scan_details` 表
///
/// 外键在建表时内联声明，SQLite 不支持事后追加外键。
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ScanDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScanDetails::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ScanDetails::ScanId).integer().not_null())
                    .col(ColumnDef::new(ScanDetails::Subdomain).string().not_null())
                    .col(ColumnDef::new(ScanDetails::Address).string().not_null())
                    .col(ColumnDef::new(ScanDetails::OpenPorts).text().not_null())
                    .col(ColumnDef::new(ScanDetails::Vulnerabilities).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_scan_details_scan")
                            .from(ScanDetails::Table, ScanDetails::ScanId)
                            .to(Scans::Table, Scans::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_scan_details_scan_id")
                    .table(ScanDetails::Table)
                    .if_not_exists()
                    .col(ScanDetails::ScanId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ScanDetails::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ScanDetails {
    Table,
    Id,
    ScanId,
    Subdomain,
    Address,
    OpenPorts,
    Vulnerabilities,
}
