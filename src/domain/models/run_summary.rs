// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scan::ScanId;
use crate::domain::repositories::scan_repository::StorageError;
use crate::domain::services::intelligence_service::UpstreamError;
use crate::utils::validators::ValidationError;
use std::fmt;
use thiserror::Error;

/// 单个域名失败的原因
#[derive(Error, Debug, Clone)]
pub enum FailureReason {
    /// 无法从上游获取 DNS 数据
    #[error("{kind} upstream error: {0}", kind = .0.kind())]
    Upstream(#[from] UpstreamError),
    /// 扫描结果未能落库
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    /// worker 异常退出
    #[error("worker aborted: {0}")]
    Internal(String),
}

impl FailureReason {
    /// 用于指标标签的简短分类
    pub fn label(&self) -> &'static str {
        match self {
            FailureReason::Upstream(e) if e.is_transient() => "upstream_transient",
            FailureReason::Upstream(_) => "upstream_permanent",
            FailureReason::Storage(_) => "storage",
            FailureReason::Internal(_) => "internal",
        }
    }
}

/// 域名在一次运行中的状态
///
/// 状态只会向前推进：
/// Pending → Fetching → Committed/Failed
#[derive(Debug, Clone)]
pub enum DomainState {
    /// 等待处理
    Pending,
    /// 正在从上游采集
    Fetching,
    /// 已提交
    Committed(ScanId),
    /// 已失败
    Failed(FailureReason),
}

impl DomainState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DomainState::Committed(_) | DomainState::Failed(_))
    }
}

impl fmt::Display for DomainState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DomainState::Pending => write!(f, "pending"),
            DomainState::Fetching => write!(f, "fetching"),
            DomainState::Committed(id) => write!(f, "committed(scan {})", id),
            DomainState::Failed(_) => write!(f, "failed"),
        }
    }
}

/// 失败的域名及原因
#[derive(Debug, Clone)]
pub struct DomainFailure {
    pub domain: String,
    pub reason: FailureReason,
}

/// 输入中被拒绝的行
#[derive(Debug, Clone)]
pub struct RejectedRow {
    /// 源文件中的行号（从1开始）
    pub line: usize,
    pub value: String,
    pub error: ValidationError,
}

/// 一次运行的汇总报告
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// 成功提交的域名数
    pub succeeded: usize,
    /// 按输入顺序排列的成功提交
    pub committed: Vec<(String, ScanId)>,
    /// 按输入顺序排列的失败域名
    pub failed: Vec<DomainFailure>,
    /// 输入校验未通过、被跳过的行
    pub rejected: Vec<RejectedRow>,
    /// 收到停止信号后未开始处理的域名
    pub cancelled: Vec<String>,
}

impl RunSummary {
    /// 进程退出码：全部成功为0，否则为1
    pub fn exit_code(&self) -> u8 {
        if self.failed.is_empty() && self.cancelled.is_empty() {
            0
        } else {
            1
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code() == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Scan run summary")?;
        writeln!(f, "  succeeded: {}", self.succeeded)?;
        writeln!(f, "  failed:    {}", self.failed.len())?;
        for failure in &self.failed {
            writeln!(f, "    - {}: {}", failure.domain, failure.reason)?;
        }
        if !self.rejected.is_empty() {
            writeln!(f, "  rejected input rows: {}", self.rejected.len())?;
            for row in &self.rejected {
                writeln!(f, "    - line {} ({:?}): {}", row.line, row.value, row.error)?;
            }
        }
        if !self.cancelled.is_empty() {
            writeln!(f, "  cancelled before start: {}", self.cancelled.len())?;
            for domain in &self.cancelled {
                writeln!(f, "    - {}", domain)?;
            }
        }
        Ok(())
    }
}
