// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 子域名缺少解析地址时写入的占位值
pub const ADDRESS_NOT_AVAILABLE: &str = "N/A";

/// 扫描ID，由存储层分配
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScanId(pub i32);

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 扫描实体
///
/// 表示某个域名在某一天的一次数据采集。写入后不可变；
/// 同一域名重复扫描会产生新的行，而不是更新旧行。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scan {
    /// 扫描ID
    pub id: ScanId,
    /// 被扫描的域名
    pub domain_name: String,
    /// 扫描日期（UTC）
    pub scan_date: NaiveDate,
}

/// 子域名记录
///
/// 扫描处理器产出的内存值，此时尚未归属任何扫描；
/// 存储层在同一事务中为其分配所属扫描ID。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubdomainRecord {
    /// 完整子域名，无子域部分时等于父域名
    pub subdomain: String,
    /// 解析地址或别名目标，缺失时为 `N/A`
    pub address: String,
    /// 开放端口，保持上游返回的顺序
    pub open_ports: Vec<u16>,
    /// 漏洞编号，空表示没有已知漏洞
    pub vulnerabilities: Vec<String>,
}

/// 读取侧的扫描明细行
///
/// 对应 `scans` 与 `scan_details` 的连接查询结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRow {
    pub scan_id: ScanId,
    pub domain_name: String,
    pub scan_date: NaiveDate,
    pub record: SubdomainRecord,
}
