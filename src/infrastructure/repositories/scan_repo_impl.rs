// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::scan::{Scan, ScanId, ScanRow, SubdomainRecord};
use crate::domain::repositories::scan_repository::{ScanRepository, StorageError};
use crate::infrastructure::database::entities::{scan as scan_entity, scan_detail as detail_entity};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use metrics::counter;
use sea_orm::*;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// 列表字段在存储中的分隔符，与读取侧保持一致
pub const LIST_DELIMITER: &str = ", ";

/// 旧数据中表示“无漏洞”的占位值
const LEGACY_NO_VULNS: &str = "None";

/// 单条 INSERT 语句最多携带的明细行数
const DETAIL_BATCH_SIZE: usize = 100;

/// 将端口列表编码为存储格式
pub fn encode_ports(ports: &[u16]) -> String {
    ports
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(LIST_DELIMITER)
}

/// 解析存储中的端口列表，忽略无法解析的片段
pub fn decode_ports(raw: &str) -> Vec<u16> {
    raw.split(',')
        .filter_map(|p| p.trim().parse().ok())
        .collect()
}

/// 将漏洞编号编码为存储格式，空列表编码为空字符串
pub fn encode_vulnerabilities(vulns: &[String]) -> String {
    vulns.join(LIST_DELIMITER)
}

/// 解析存储中的漏洞编号
pub fn decode_vulnerabilities(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != LEGACY_NO_VULNS)
        .map(str::to_string)
        .collect()
}

/// 扫描仓库实现
///
/// 每次提交从连接池取出一个连接并开启事务，事务对象在所有退出路径上
/// 都会被释放：提交成功、出错提前返回，或者 future 被丢弃时自动回滚。
pub struct ScanRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl ScanRepositoryImpl {
    /// 创建新的扫描仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// 写入扫描表头行
    pub(crate) async fn insert_scan<C: ConnectionTrait>(
        conn: &C,
        domain: &str,
        scan_date: NaiveDate,
    ) -> Result<ScanId, DbErr> {
        let model = scan_entity::ActiveModel {
            domain_name: Set(domain.to_string()),
            scan_date: Set(scan_date),
            ..Default::default()
        };
        let inserted = model.insert(conn).await?;
        Ok(ScanId(inserted.id))
    }

    /// 批量写入明细行
    pub(crate) async fn insert_details<C: ConnectionTrait>(
        conn: &C,
        scan_id: ScanId,
        records: &[SubdomainRecord],
    ) -> Result<u64, DbErr> {
        for chunk in records.chunks(DETAIL_BATCH_SIZE) {
            let models = chunk.iter().map(|record| detail_entity::ActiveModel {
                scan_id: Set(scan_id.0),
                subdomain: Set(record.subdomain.clone()),
                address: Set(record.address.clone()),
                open_ports: Set(encode_ports(&record.open_ports)),
                vulnerabilities: Set(encode_vulnerabilities(&record.vulnerabilities)),
                ..Default::default()
            });
            detail_entity::Entity::insert_many(models).exec(conn).await?;
        }
        Ok(records.len() as u64)
    }

    fn to_row(detail: detail_entity::Model, scan: scan_entity::Model) -> ScanRow {
        ScanRow {
            scan_id: ScanId(scan.id),
            domain_name: scan.domain_name,
            scan_date: scan.scan_date,
            record: SubdomainRecord {
                subdomain: detail.subdomain,
                address: detail.address,
                open_ports: decode_ports(&detail.open_ports),
                vulnerabilities: decode_vulnerabilities(&detail.vulnerabilities),
            },
        }
    }
}

#[async_trait]
impl ScanRepository for ScanRepositoryImpl {
    #[instrument(skip(self, records), fields(records = records.len()))]
    async fn commit_scan(
        &self,
        domain: &str,
        records: &[SubdomainRecord],
    ) -> Result<ScanId, StorageError> {
        if domain.trim().is_empty() {
            return Err(StorageError::ConstraintViolation(
                "scans.domain_name must not be empty".to_string(),
            ));
        }

        let txn = self.db.begin().await.map_err(StorageError::transaction)?;

        let scan_id = Self::insert_scan(&txn, domain, Utc::now().date_naive()).await?;
        let written = Self::insert_details(&txn, scan_id, records).await?;

        txn.commit().await.map_err(StorageError::transaction)?;

        counter!("scans_committed_total").increment(1);
        counter!("scan_details_committed_total").increment(written);
        info!("Committed scan {} for {} with {} details", scan_id, domain, written);
        Ok(scan_id)
    }

    async fn find_scan_rows(&self, domain: Option<&str>) -> Result<Vec<ScanRow>, StorageError> {
        let mut query = detail_entity::Entity::find()
            .find_also_related(scan_entity::Entity)
            .order_by_desc(scan_entity::Column::ScanDate)
            .order_by_desc(scan_entity::Column::Id)
            .order_by_asc(detail_entity::Column::Id);

        if let Some(domain) = domain {
            query = query.filter(scan_entity::Column::DomainName.eq(domain));
        }

        let rows = query.all(self.db.as_ref()).await?;
        debug!("Loaded {} scan rows", rows.len());

        Ok(rows
            .into_iter()
            .filter_map(|(detail, scan)| scan.map(|scan| Self::to_row(detail, scan)))
            .collect())
    }

    async fn find_scans(&self, domain: &str) -> Result<Vec<Scan>, StorageError> {
        let scans = scan_entity::Entity::find()
            .filter(scan_entity::Column::DomainName.eq(domain))
            .order_by_asc(scan_entity::Column::Id)
            .all(self.db.as_ref())
            .await?;

        Ok(scans
            .into_iter()
            .map(|m| Scan {
                id: ScanId(m.id),
                domain_name: m.domain_name,
                scan_date: m.scan_date,
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        self.db
            .ping()
            .await
            .map_err(|e| StorageError::ConnectionLost(e.to_string()))
    }
}
