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

use crate::domain::models::intelligence::{DnsEntry, RecordType};
use crate::domain::models::scan::{SubdomainRecord, ADDRESS_NOT_AVAILABLE};
use crate::domain::services::intelligence_service::{IntelligenceSource, UpstreamError};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// 扫描处理器
///
/// 将一个域名的 DNS 记录整理为子域名记录：
/// 1. 从情报源获取 DNS 记录，获取失败会原样向上传播
/// 2. 只保留 `A` 与 `CNAME` 记录
/// 3. 对带地址的 `A` 记录补充漏洞信息，单条查询失败只会让该记录的漏洞列表为空
///
/// 主机详情的成功结果在处理器生命周期内缓存，多个 `A` 记录指向同一地址时
/// 不会重复调用上游。处理器在所有 worker 之间共享。
pub struct ScanProcessor {
    source: Arc<dyn IntelligenceSource>,
    host_cache: DashMap<String, Vec<String>>,
}

impl ScanProcessor {
    /// 创建新的扫描处理器
    ///
    /// # 参数
    ///
    /// * `source` - 情报源，通常是已经带限流和重试的客户端
    pub fn new(source: Arc<dyn IntelligenceSource>) -> Self {
        Self {
            source,
            host_cache: DashMap::new(),
        }
    }

    /// 处理单个域名
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<SubdomainRecord>)` - 整理后的记录，可能为空
    /// * `Err(UpstreamError)` - 无法获得该域名的 DNS 数据
    #[instrument(skip(self))]
    pub async fn process_domain(&self, domain: &str) -> Result<Vec<SubdomainRecord>, UpstreamError> {
        let entries = self.source.fetch_dns_entries(domain).await.map_err(|e| {
            warn!("DNS lookup failed for {}: {}", domain, e);
            e
        })?;
        debug!("Received {} DNS entries", entries.len());

        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            if !entry.record_type.is_recorded() {
                debug!("Skipping {} record {:?}", entry.record_type, entry.subdomain);
                continue;
            }
            records.push(self.build_record(entry, domain).await);
        }

        Ok(records)
    }

    async fn build_record(&self, entry: DnsEntry, domain: &str) -> SubdomainRecord {
        let subdomain = subdomain_name(&entry.subdomain, domain);
        let value = entry.value.filter(|v| !v.trim().is_empty());

        let vulnerabilities = match (&entry.record_type, value.as_deref()) {
            (RecordType::A, Some(address)) => self.lookup_vulnerabilities(address).await,
            _ => Vec::new(),
        };

        SubdomainRecord {
            subdomain,
            address: value.unwrap_or_else(|| ADDRESS_NOT_AVAILABLE.to_string()),
            open_ports: entry.ports,
            vulnerabilities,
        }
    }

    async fn lookup_vulnerabilities(&self, address: &str) -> Vec<String> {
        if let Some(cached) = self.host_cache.get(address) {
            return cached.clone();
        }

        match self.source.fetch_host_details(address).await {
            Ok(details) => {
                let vulns = details.map(|d| d.vulns).unwrap_or_default();
                self.host_cache.insert(address.to_string(), vulns.clone());
                vulns
            }
            Err(e) => {
                // Not cached: a later record may succeed
                warn!("Host lookup for {} failed, recording no vulnerabilities: {}", address, e);
                Vec::new()
            }
        }
    }
}

/// 拼接完整子域名，标签为空时返回父域名本身
pub fn subdomain_name(label: &str, domain: &str) -> String {
    let label = label.trim().trim_end_matches('.');
    if label.is_empty() {
        domain.to_string()
    } else {
        format!("{}.{}", label, domain)
    }
}
