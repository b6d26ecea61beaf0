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

use crate::domain::models::run_summary::{DomainFailure, DomainState, FailureReason, RunSummary};
use crate::domain::repositories::scan_repository::ScanRepository;
use crate::domain::services::scan_processor::ScanProcessor;
use futures::stream::{self, StreamExt};
use metrics::counter;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// 流水线编排器
///
/// 按输入顺序驱动每个域名的 采集 → 整理 → 提交 流程。
/// 每个域名相互独立，一个域名失败不会中止整次运行；
/// 编排器自身不重试，重试属于情报客户端。
///
/// 并行度为 K 时最多同时有 K 个 worker，每个域名在独立的任务中执行，
/// 所有 worker 共享同一个处理器及其限流客户端。
/// 收到停止信号后不再开始新的域名，已经开始的提交会执行完毕或回滚。
pub struct PipelineOrchestrator {
    processor: Arc<ScanProcessor>,
    repository: Arc<dyn ScanRepository>,
    parallelism: usize,
    shutdown: CancellationToken,
}

impl PipelineOrchestrator {
    /// 创建新的编排器
    ///
    /// # 参数
    ///
    /// * `processor` - 扫描处理器
    /// * `repository` - 扫描仓库
    /// * `parallelism` - 同时处理的域名数，最小为1
    pub fn new(
        processor: Arc<ScanProcessor>,
        repository: Arc<dyn ScanRepository>,
        parallelism: usize,
    ) -> Self {
        Self {
            processor,
            repository,
            parallelism: parallelism.max(1),
            shutdown: CancellationToken::new(),
        }
    }

    /// 使用外部停止信号
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// 运行流水线
    ///
    /// # 参数
    ///
    /// * `domains` - 按顺序处理的域名
    ///
    /// # 返回值
    ///
    /// 运行汇总，各列表保持输入顺序
    pub async fn run(&self, domains: Vec<String>) -> RunSummary {
        info!(
            "Starting scan run for {} domains (parallel = {})",
            domains.len(),
            self.parallelism
        );

        let mut outcomes = stream::iter(domains)
            .map(|domain| async move {
                if self.shutdown.is_cancelled() {
                    return (domain, None);
                }
                let state = self.spawn_domain(domain.clone()).await;
                (domain, Some(state))
            })
            .buffered(self.parallelism);

        let mut summary = RunSummary::default();
        while let Some((domain, state)) = outcomes.next().await {
            match state {
                None => summary.cancelled.push(domain),
                Some(DomainState::Committed(scan_id)) => {
                    summary.succeeded += 1;
                    summary.committed.push((domain, scan_id));
                }
                Some(DomainState::Failed(reason)) => {
                    counter!("domains_failed_total", "kind" => reason.label()).increment(1);
                    summary.failed.push(DomainFailure { domain, reason });
                }
                Some(state) => {
                    // run_domain only returns terminal states
                    error!("Domain {} ended in non-terminal state {}", domain, state);
                    summary.failed.push(DomainFailure {
                        domain,
                        reason: FailureReason::Internal(format!("ended in state {}", state)),
                    });
                }
            }
        }

        if !summary.cancelled.is_empty() {
            warn!(
                "Run stopped early, {} domains not started",
                summary.cancelled.len()
            );
        }
        info!(
            "Scan run finished: {} succeeded, {} failed",
            summary.succeeded,
            summary.failed.len()
        );
        summary
    }

    async fn spawn_domain(&self, domain: String) -> DomainState {
        let processor = self.processor.clone();
        let repository = self.repository.clone();

        // A detached task keeps running to the end of its commit even if the run is dropped
        match tokio::spawn(run_domain(processor, repository, domain)).await {
            Ok(state) => state,
            Err(e) => DomainState::Failed(FailureReason::Internal(e.to_string())),
        }
    }
}

/// 处理单个域名直到终止状态
#[instrument(skip(processor, repository))]
pub async fn run_domain(
    processor: Arc<ScanProcessor>,
    repository: Arc<dyn ScanRepository>,
    domain: String,
) -> DomainState {
    let mut state = DomainState::Pending;
    advance(&domain, &mut state, DomainState::Fetching);

    let next = match processor.process_domain(&domain).await {
        Err(e) => DomainState::Failed(FailureReason::Upstream(e)),
        Ok(records) => match repository.commit_scan(&domain, &records).await {
            Ok(scan_id) => DomainState::Committed(scan_id),
            Err(e) => {
                error!("Failed to store scan for {}: {}", domain, e);
                DomainState::Failed(FailureReason::Storage(e))
            }
        },
    };

    advance(&domain, &mut state, next);
    state
}

fn advance(domain: &str, state: &mut DomainState, next: DomainState) {
    debug_assert!(!state.is_terminal(), "terminal states never transition");
    debug!("{}: {} -> {}", domain, state, next);
    *state = next;
}

/// 监听 Ctrl-C 并触发停止信号
pub fn spawn_shutdown_listener(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            result = signal::ctrl_c() => match result {
                Ok(()) => {
                    warn!("Shutdown signal received, finishing in-flight domains");
                    token.cancel();
                }
                Err(err) => error!("Unable to listen for shutdown signal: {}", err),
            },
            _ = token.cancelled() => {}
        }
    })
}
