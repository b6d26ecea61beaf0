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

use crate::domain::models::intelligence::{DnsEntry, HostDetails};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// 上游错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 重试后可能成功
    Transient,
    /// 重试也不会成功
    Permanent,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::Transient => write!(f, "transient"),
            ErrorKind::Permanent => write!(f, "permanent"),
        }
    }
}

/// 上游情报服务错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// 超时
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// 被上游限流
    #[error("rate limited by upstream")]
    RateLimited,
    /// 上游服务端错误
    #[error("upstream server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },
    /// 网络错误
    #[error("network error: {0}")]
    Network(String),
    /// 域名或地址无效
    #[error("invalid query target: {0}")]
    InvalidDomain(String),
    /// 查询额度耗尽
    #[error("query quota exhausted: {0}")]
    QuotaExhausted(String),
    /// 请求被拒绝（凭证无效等）
    #[error("request rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
    /// 响应无法解析
    #[error("malformed upstream response: {0}")]
    InvalidResponse(String),
}

impl UpstreamError {
    /// 获取错误分类
    pub fn kind(&self) -> ErrorKind {
        match self {
            UpstreamError::Timeout(_)
            | UpstreamError::RateLimited
            | UpstreamError::Server { .. }
            | UpstreamError::Network(_) => ErrorKind::Transient,
            UpstreamError::InvalidDomain(_)
            | UpstreamError::QuotaExhausted(_)
            | UpstreamError::Rejected { .. }
            | UpstreamError::InvalidResponse(_) => ErrorKind::Permanent,
        }
    }

    /// 判断错误是否可重试
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }

    /// 用于指标标签的错误名称
    pub fn label(&self) -> &'static str {
        match self {
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::RateLimited => "rate_limited",
            UpstreamError::Server { .. } => "server",
            UpstreamError::Network(_) => "network",
            UpstreamError::InvalidDomain(_) => "invalid_domain",
            UpstreamError::QuotaExhausted(_) => "quota_exhausted",
            UpstreamError::Rejected { .. } => "rejected",
            UpstreamError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// 主机情报源特质
///
/// 对外部主机情报服务的抽象。传输层实现每次调用只发起一次请求；
/// 限流与重试由 [`RateLimitedClient`] 以装饰器方式叠加，
/// 调用方无需自行节流。
///
/// [`RateLimitedClient`]: crate::infrastructure::intelligence::rate_limited_client::RateLimitedClient
#[async_trait]
pub trait IntelligenceSource: Send + Sync {
    /// 获取域名的 DNS 记录
    ///
    /// 成功返回空列表表示上游确实没有记录，与获取失败严格区分。
    async fn fetch_dns_entries(&self, domain: &str) -> Result<Vec<DnsEntry>, UpstreamError>;

    /// 获取主机详情
    ///
    /// # 返回值
    ///
    /// * `Ok(Some(HostDetails))` - 上游有该主机的数据
    /// * `Ok(None)` - 上游没有该主机的数据
    /// * `Err(UpstreamError)` - 查询失败
    async fn fetch_host_details(&self, address: &str)
        -> Result<Option<HostDetails>, UpstreamError>;
}
