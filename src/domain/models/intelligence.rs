// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS 记录类型
///
/// 只有 `A` 和 `CNAME` 会被记录，其余类型原样保留以便日志输出。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordType {
    A,
    Cname,
    Other(String),
}

impl RecordType {
    /// 是否需要写入扫描结果
    pub fn is_recorded(&self) -> bool {
        matches!(self, RecordType::A | RecordType::Cname)
    }
}

impl From<String> for RecordType {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "A" => RecordType::A,
            "CNAME" => RecordType::Cname,
            _ => RecordType::Other(value),
        }
    }
}

impl From<RecordType> for String {
    fn from(value: RecordType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordType::A => write!(f, "A"),
            RecordType::Cname => write!(f, "CNAME"),
            RecordType::Other(other) => write!(f, "{}", other),
        }
    }
}

/// 上游返回的单条 DNS 记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsEntry {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// 子域标签，可能为空
    #[serde(default)]
    pub subdomain: String,
    /// 目标地址或别名
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub ports: Vec<u16>,
}

impl DnsEntry {
    pub fn new(record_type: RecordType, subdomain: &str, value: Option<&str>, ports: Vec<u16>) -> Self {
        Self {
            record_type,
            subdomain: subdomain.to_string(),
            value: value.map(str::to_string),
            ports,
        }
    }
}

/// 主机详情
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostDetails {
    #[serde(default)]
    pub vulns: Vec<String>,
}
