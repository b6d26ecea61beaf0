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

use crate::config::settings::IntelligenceSettings;
use crate::domain::models::intelligence::{DnsEntry, HostDetails};
use crate::domain::services::intelligence_service::{IntelligenceSource, UpstreamError};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// 错误信息截断长度
const MAX_ERROR_BODY: usize = 200;

/// 客户端构建错误
#[derive(Error, Debug)]
pub enum SourceBuildError {
    /// 根地址无效
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    /// HTTP 客户端构建失败
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct DnsDomainResponse {
    #[serde(default)]
    data: Vec<DnsEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// 主机情报 REST 传输层
///
/// 每个方法只发起一次 HTTP 请求，并把 HTTP 层面的失败翻译为
/// [`UpstreamError`]。凭证以查询参数 `key` 传递，错误信息中会去掉URL以免泄露凭证。
pub struct ShodanSource {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    timeout: Duration,
}

impl ShodanSource {
    /// 根据配置创建传输层
    pub fn new(settings: &IntelligenceSettings) -> Result<Self, SourceBuildError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|e| SourceBuildError::InvalidBaseUrl(format!("{}: {}", settings.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SourceBuildError::InvalidBaseUrl(settings.base_url.clone()));
        }

        let timeout = settings.request_timeout();
        let client = reqwest::Client::builder()
            .user_agent(concat!("scanvault/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .pool_max_idle_per_host(4)
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: settings.api_key.clone(),
            timeout,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.query_pairs_mut().append_pair("key", &self.api_key);
        url
    }

    async fn get(&self, url: Url) -> Result<(StatusCode, String), UpstreamError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.translate(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.translate(e))?;
        Ok((status, body))
    }

    fn translate(&self, err: reqwest::Error) -> UpstreamError {
        let err = err.without_url();
        if err.is_timeout() {
            UpstreamError::Timeout(self.timeout)
        } else {
            UpstreamError::Network(err.to_string())
        }
    }
}

/// 根据状态码翻译上游错误
///
/// 401/403 同时用于凭证无效与额度耗尽，需要根据错误信息区分。
pub(crate) fn classify_status(status: StatusCode, body: &str, target: &str) -> UpstreamError {
    let message = error_message(body);
    let code = status.as_u16();
    match code {
        429 => UpstreamError::RateLimited,
        408 => UpstreamError::Server {
            status: code,
            message,
        },
        _ if status.is_server_error() => UpstreamError::Server {
            status: code,
            message,
        },
        400 | 404 | 422 => UpstreamError::InvalidDomain(format!("{}: {}", target, message)),
        402 => UpstreamError::QuotaExhausted(message),
        401 | 403 if mentions_quota(&message) => UpstreamError::QuotaExhausted(message),
        _ => UpstreamError::Rejected {
            status: code,
            message,
        },
    }
}

fn mentions_quota(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["credit", "quota", "limit", "plan"]
        .iter()
        .any(|needle| lower.contains(needle))
}

fn error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "no error message".to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY).collect()
}

#[async_trait]
impl IntelligenceSource for ShodanSource {
    async fn fetch_dns_entries(&self, domain: &str) -> Result<Vec<DnsEntry>, UpstreamError> {
        let (status, body) = self.get(self.endpoint(&["dns", "domain", domain])).await?;
        if !status.is_success() {
            return Err(classify_status(status, &body, domain));
        }

        let parsed: DnsDomainResponse = serde_json::from_str(&body)
            .map_err(|e| UpstreamError::InvalidResponse(e.to_string()))?;
        debug!("dns/domain/{} returned {} entries", domain, parsed.data.len());
        Ok(parsed.data)
    }

    async fn fetch_host_details(
        &self,
        address: &str,
    ) -> Result<Option<HostDetails>, UpstreamError> {
        let (status, body) = self.get(self.endpoint(&["shodan", "host", address])).await?;
        if status == StatusCode::NOT_FOUND {
            // No information available for that IP
            return Ok(None);
        }
        if !status.is_success() {
            return Err(classify_status(status, &body, address));
        }

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| UpstreamError::InvalidResponse(e.to_string()))
    }
}
