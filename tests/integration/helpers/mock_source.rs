// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use scanvault::domain::models::intelligence::{DnsEntry, HostDetails};
use scanvault::domain::services::intelligence_service::{IntelligenceSource, UpstreamError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

/// 内存情报源
///
/// 按域名与地址返回预先配置的结果，并记录调用次数
#[derive(Default)]
pub struct MockSource {
    dns: HashMap<String, Result<Vec<DnsEntry>, UpstreamError>>,
    hosts: HashMap<String, Result<Option<HostDetails>, UpstreamError>>,
    pub dns_calls: AtomicUsize,
    pub host_calls: AtomicUsize,
    cancel_on: Option<(String, CancellationToken)>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dns(mut self, domain: &str, entries: Vec<DnsEntry>) -> Self {
        self.dns.insert(domain.to_string(), Ok(entries));
        self
    }

    pub fn with_dns_error(mut self, domain: &str, err: UpstreamError) -> Self {
        self.dns.insert(domain.to_string(), Err(err));
        self
    }

    pub fn with_host(mut self, address: &str, vulns: &[&str]) -> Self {
        self.hosts.insert(
            address.to_string(),
            Ok(Some(HostDetails {
                vulns: vulns.iter().map(|v| v.to_string()).collect(),
            })),
        );
        self
    }

    pub fn with_host_error(mut self, address: &str, err: UpstreamError) -> Self {
        self.hosts.insert(address.to_string(), Err(err));
        self
    }

    /// 查询指定域名的 DNS 时触发停止信号
    pub fn cancel_during(mut self, domain: &str, token: CancellationToken) -> Self {
        self.cancel_on = Some((domain.to_string(), token));
        self
    }

    pub fn dns_calls(&self) -> usize {
        self.dns_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IntelligenceSource for MockSource {
    async fn fetch_dns_entries(&self, domain: &str) -> Result<Vec<DnsEntry>, UpstreamError> {
        self.dns_calls.fetch_add(1, Ordering::SeqCst);
        if let Some((target, token)) = &self.cancel_on {
            if target == domain {
                token.cancel();
            }
        }
        self.dns
            .get(domain)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_host_details(
        &self,
        address: &str,
    ) -> Result<Option<HostDetails>, UpstreamError> {
        self.host_calls.fetch_add(1, Ordering::SeqCst);
        self.hosts.get(address).cloned().unwrap_or(Ok(None))
    }
}
