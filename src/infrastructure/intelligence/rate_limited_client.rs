// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::IntelligenceSettings;
use crate::domain::models::intelligence::{DnsEntry, HostDetails};
use crate::domain::services::intelligence_service::{IntelligenceSource, UpstreamError};
use crate::utils::retry_policy::RetryPolicy;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use metrics::counter;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// 带限流与重试的情报客户端
///
/// 以装饰器方式包装任意 [`IntelligenceSource`]：
/// - 两次调用之间至少间隔 `min_interval`（令牌桶容量为1）
/// - 同时在途的调用不超过 `max_in_flight`
/// - 每次调用都有超时，超时视为可重试错误
/// - 可重试错误按 [`RetryPolicy`] 指数退避重试，不可重试错误立即返回
///
/// 所有 worker 共享同一个实例，因此并行度提高时总调用速率不变。
pub struct RateLimitedClient {
    inner: Arc<dyn IntelligenceSource>,
    limiter: Option<DefaultDirectRateLimiter>,
    in_flight: Semaphore,
    call_timeout: Duration,
    retry_policy: RetryPolicy,
}

impl RateLimitedClient {
    /// 根据配置创建客户端
    pub fn new(
        inner: Arc<dyn IntelligenceSource>,
        settings: &IntelligenceSettings,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self::with_limits(
            inner,
            settings.min_interval(),
            settings.max_in_flight,
            settings.request_timeout(),
            retry_policy,
        )
    }

    /// 使用显式参数创建客户端
    ///
    /// `min_interval` 为零时不做间隔限制；`max_in_flight` 至少为1。
    pub fn with_limits(
        inner: Arc<dyn IntelligenceSource>,
        min_interval: Duration,
        max_in_flight: usize,
        call_timeout: Duration,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            inner,
            limiter: Quota::with_period(min_interval).map(RateLimiter::direct),
            in_flight: Semaphore::new(max_in_flight.max(1)),
            call_timeout,
            retry_policy,
        }
    }

    async fn call<T, F, Fut>(&self, op: &'static str, target: &str, f: F) -> Result<T, UpstreamError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, UpstreamError>>,
    {
        let mut retries = 0;
        loop {
            match self.attempt(op, &f).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && self.retry_policy.should_retry(retries) => {
                    retries += 1;
                    let backoff = self.retry_policy.calculate_backoff(retries);
                    warn!(
                        "{} {} failed ({}), retry {}/{} in {:?}",
                        op, target, e, retries, self.retry_policy.max_retries, backoff
                    );
                    counter!("upstream_retries_total", "op" => op).increment(1);
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    counter!("upstream_failures_total", "op" => op, "kind" => e.label())
                        .increment(1);
                    if retries > 0 {
                        warn!("{} {} gave up after {} retries: {}", op, target, retries, e);
                    }
                    return Err(e);
                }
            }
        }
    }

    async fn attempt<T, F, Fut>(&self, op: &'static str, f: &F) -> Result<T, UpstreamError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, UpstreamError>>,
    {
        // Held for the duration of one request only, never across backoff
        let _permit = self
            .in_flight
            .acquire()
            .await
            .map_err(|_| UpstreamError::Network("intelligence client closed".to_string()))?;

        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        counter!("upstream_requests_total", "op" => op).increment(1);
        debug!("Calling upstream {}", op);

        match tokio::time::timeout(self.call_timeout, f()).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout(self.call_timeout)),
        }
    }
}

#[async_trait]
impl IntelligenceSource for RateLimitedClient {
    async fn fetch_dns_entries(&self, domain: &str) -> Result<Vec<DnsEntry>, UpstreamError> {
        self.call("dns", domain, || self.inner.fetch_dns_entries(domain))
            .await
    }

    async fn fetch_host_details(
        &self,
        address: &str,
    ) -> Result<Option<HostDetails>, UpstreamError> {
        self.call("host", address, || self.inner.fetch_host_details(address))
            .await
    }
}
