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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含数据库、上游情报服务、重试、流水线并发和指标导出等配置项。
/// 配置值显式传入各组件的构造函数，不存在进程级单例。
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 上游情报服务配置
    pub intelligence: IntelligenceSettings,
    /// 重试配置
    pub retry: RetrySettings,
    /// 流水线配置
    pub pipeline: PipelineSettings,
    /// 指标配置
    #[serde(default)]
    pub metrics: MetricsSettings,
    /// 日志配置
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// 上游情报服务配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct IntelligenceSettings {
    /// API 凭证
    pub api_key: String,
    /// 服务根地址
    pub base_url: String,
    /// 两次调用之间的最小间隔（毫秒），0 表示不限制
    pub min_interval_ms: u64,
    /// 同时在途的最大调用数
    pub max_in_flight: usize,
    /// 单次调用超时（秒）
    pub request_timeout_secs: u64,
}

impl IntelligenceSettings {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 重试配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    /// 最大重试次数
    pub max_retries: u32,
    /// 初始退避（毫秒）
    pub initial_backoff_ms: u64,
    /// 最大退避（毫秒）
    pub max_backoff_ms: u64,
    /// 退避乘数
    pub backoff_multiplier: f64,
    /// 是否启用抖动
    pub enable_jitter: bool,
    /// 抖动因子
    pub jitter_factor: f64,
}

/// 流水线配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    /// 并行处理的域名数
    pub parallel: usize,
}

/// 指标配置设置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsSettings {
    /// Prometheus 导出地址，未设置则不导出
    pub listen_addr: Option<SocketAddr>,
}

/// 日志配置设置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingSettings {
    /// 是否输出 JSON 格式日志
    #[serde(default)]
    pub json: bool,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从默认值、配置文件和环境变量依次加载，后者覆盖前者
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("SCANVAULT").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 仅包含默认值的配置构建器
    pub fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Default DB settings
            .set_default("database.url", "sqlite://scan_data.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default upstream settings
            .set_default("intelligence.api_key", "")?
            .set_default("intelligence.base_url", "https://api.shodan.io")?
            .set_default("intelligence.min_interval_ms", 1000)?
            .set_default("intelligence.max_in_flight", 1)?
            .set_default("intelligence.request_timeout_secs", 30)?
            // Default retry settings
            .set_default("retry.max_retries", 3)?
            .set_default("retry.initial_backoff_ms", 500)?
            .set_default("retry.max_backoff_ms", 8000)?
            .set_default("retry.backoff_multiplier", 2.0)?
            .set_default("retry.enable_jitter", false)?
            .set_default("retry.jitter_factor", 0.1)?
            // Default pipeline settings
            .set_default("pipeline.parallel", 1)?
            .set_default("logging.json", false)
    }

    /// 校验配置
    ///
    /// 返回第一条不合法配置的说明
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.intelligence.api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "intelligence.api_key is required (set SCANVAULT__INTELLIGENCE__API_KEY)".into(),
            ));
        }
        if self.intelligence.max_in_flight == 0 {
            return Err(ConfigError::Message(
                "intelligence.max_in_flight must be at least 1".into(),
            ));
        }
        if self.intelligence.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "intelligence.request_timeout_secs must be at least 1".into(),
            ));
        }
        if self.pipeline.parallel == 0 {
            return Err(ConfigError::Message(
                "pipeline.parallel must be at least 1".into(),
            ));
        }
        if !self.retry.backoff_multiplier.is_finite() || self.retry.backoff_multiplier < 1.0 {
            return Err(ConfigError::Message(
                "retry.backoff_multiplier must be a finite value >= 1.0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.retry.jitter_factor) {
            return Err(ConfigError::Message(
                "retry.jitter_factor must be between 0.0 and 1.0".into(),
            ));
        }
        Ok(())
    }
}
