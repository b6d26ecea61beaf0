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

use anyhow::Context;
use clap::Parser;
use scanvault::config::settings::Settings;
use scanvault::domain::models::run_summary::RunSummary;
use scanvault::domain::repositories::scan_repository::ScanRepository;
use scanvault::domain::services::scan_processor::ScanProcessor;
use scanvault::infrastructure::database::connection;
use scanvault::infrastructure::domain_source::FileDomainSource;
use scanvault::infrastructure::intelligence::rate_limited_client::RateLimitedClient;
use scanvault::infrastructure::intelligence::shodan_source::ShodanSource;
use scanvault::infrastructure::metrics::init_metrics;
use scanvault::infrastructure::repositories::scan_repo_impl::ScanRepositoryImpl;
use scanvault::utils::retry_policy::RetryPolicy;
use scanvault::utils::telemetry;
use scanvault::workers::orchestrator::{spawn_shutdown_listener, PipelineOrchestrator};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// 启动失败时的退出码
const EXIT_STARTUP_FAILURE: u8 = 2;

/// Collect DNS, port and vulnerability data for a list of domains and store
/// one timestamped scan per domain.
#[derive(Parser, Debug)]
#[command(name = "scanvault", version, about)]
struct Cli {
    /// Domain list: a .csv/.tsv file with a header row, or one domain per line
    domains: PathBuf,

    /// Number of domains processed concurrently
    #[arg(long, value_name = "K")]
    parallel: Option<usize>,

    /// Retries per upstream call on transient errors
    #[arg(long, value_name = "N")]
    retries: Option<u32>,
}

/// 主函数
///
/// 退出码：0 全部成功，1 存在失败或未处理的域名，2 启动失败
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("scanvault: {:#}", e);
            return ExitCode::from(EXIT_STARTUP_FAILURE);
        }
    };

    telemetry::init_telemetry(settings.logging.json);
    info!("Starting scanvault...");

    match run(cli, settings).await {
        Ok(summary) => {
            print!("{}", summary);
            ExitCode::from(summary.exit_code())
        }
        Err(e) => {
            error!("Startup failed: {:#}", e);
            eprintln!("scanvault: {:#}", e);
            ExitCode::from(EXIT_STARTUP_FAILURE)
        }
    }
}

/// 加载配置并应用命令行覆盖
fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = Settings::new().context("failed to load configuration")?;

    if let Some(parallel) = cli.parallel {
        settings.pipeline.parallel = parallel;
    }
    if let Some(retries) = cli.retries {
        settings.retry.max_retries = retries;
    }

    settings.validate().context("invalid configuration")?;
    Ok(settings)
}

async fn run(cli: Cli, settings: Settings) -> anyhow::Result<RunSummary> {
    init_metrics(settings.metrics.listen_addr);

    // 1. Read the domain list
    let list = FileDomainSource::new(&cli.domains)
        .load()
        .await
        .context("domain source unreadable")?;

    // 2. Connect to storage and apply migrations
    let db = connection::open_storage(&settings.database)
        .await
        .context("storage unreachable")?;
    let repository: Arc<dyn ScanRepository> = Arc::new(ScanRepositoryImpl::new(Arc::new(db)));
    repository.ping().await.context("storage unreachable")?;

    // 3. Build the upstream client shared by every worker
    let transport = Arc::new(
        ShodanSource::new(&settings.intelligence).context("failed to build intelligence client")?,
    );
    let client = Arc::new(RateLimitedClient::new(
        transport,
        &settings.intelligence,
        RetryPolicy::from(&settings.retry),
    ));
    let processor = Arc::new(ScanProcessor::new(client));

    // 4. Run the pipeline
    let shutdown = CancellationToken::new();
    let listener = spawn_shutdown_listener(shutdown.clone());

    let orchestrator = PipelineOrchestrator::new(processor, repository, settings.pipeline.parallel)
        .with_shutdown(shutdown.clone());
    let mut summary = orchestrator.run(list.domains).await;
    summary.rejected = list.rejected;

    shutdown.cancel();
    let _ = listener.await;

    Ok(summary)
}
