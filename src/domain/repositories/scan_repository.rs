// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scan::{Scan, ScanId, ScanRow, SubdomainRecord};
use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;

/// 存储层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// 连接丢失或无法获取连接
    #[error("storage connection lost: {0}")]
    ConnectionLost(String),
    /// 违反约束（外键、非空、唯一）
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    /// 事务开始或提交失败
    #[error("transaction failed: {0}")]
    Transaction(String),
    /// 其他数据库错误
    #[error("database error: {0}")]
    Database(String),
}

impl StorageError {
    /// 包装事务边界上的错误
    pub fn transaction(err: DbErr) -> Self {
        match StorageError::from(err) {
            StorageError::Database(message) => StorageError::Transaction(message),
            other => other,
        }
    }
}

impl From<DbErr> for StorageError {
    fn from(err: DbErr) -> Self {
        if err.sql_err().is_some() {
            return StorageError::ConstraintViolation(err.to_string());
        }
        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => {
                StorageError::ConnectionLost(err.to_string())
            }
            other => {
                let message = other.to_string();
                // sqlx reports NOT NULL and CHECK failures as plain query errors
                if message.to_lowercase().contains("constraint") {
                    StorageError::ConstraintViolation(message)
                } else {
                    StorageError::Database(message)
                }
            }
        }
    }
}

/// 扫描仓库特质
///
/// 写入侧保证一次扫描的表头行与全部明细行在同一事务内提交；
/// 读取侧提供看板使用的连接查询。
#[async_trait]
pub trait ScanRepository: Send + Sync {
    /// 原子地提交一次扫描
    ///
    /// 每次调用都会新建一行扫描记录，同一域名重复提交不会合并。
    ///
    /// # 参数
    ///
    /// * `domain` - 被扫描的域名，不能为空
    /// * `records` - 该次扫描的子域名记录，可以为空
    ///
    /// # 返回值
    ///
    /// * `Ok(ScanId)` - 新扫描的ID
    /// * `Err(StorageError)` - 提交失败，此时没有任何行可见
    async fn commit_scan(
        &self,
        domain: &str,
        records: &[SubdomainRecord],
    ) -> Result<ScanId, StorageError>;

    /// 查询扫描明细
    ///
    /// 返回 `scans` 与 `scan_details` 的内连接，按扫描日期倒序排列。
    async fn find_scan_rows(&self, domain: Option<&str>) -> Result<Vec<ScanRow>, StorageError>;

    /// 查询某域名的全部扫描（包括没有明细的扫描）
    async fn find_scans(&self, domain: &str) -> Result<Vec<Scan>, StorageError>;

    /// 检查存储是否可达
    async fn ping(&self) -> Result<(), StorageError>;
}
