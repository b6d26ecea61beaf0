// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod mock_source;

use scanvault::config::settings::DatabaseSettings;
use scanvault::infrastructure::database::connection;
use scanvault::infrastructure::repositories::scan_repo_impl::ScanRepositoryImpl;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// 内存数据库配置
pub fn memory_db_settings() -> DatabaseSettings {
    DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: Some(1),
        min_connections: Some(1),
        connect_timeout: Some(5),
        idle_timeout: None,
    }
}

/// 创建已迁移的内存数据库与仓库
pub async fn setup_storage() -> (Arc<DatabaseConnection>, Arc<ScanRepositoryImpl>) {
    let db = connection::open_storage(&memory_db_settings())
        .await
        .expect("in-memory storage should open");
    let db = Arc::new(db);
    let repo = Arc::new(ScanRepositoryImpl::new(db.clone()));
    (db, repo)
}
