// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 安装 Prometheus 导出器
///
/// 未配置地址时不安装，`metrics` 宏退化为空操作。
pub fn init_metrics(listen_addr: Option<SocketAddr>) {
    let Some(addr) = listen_addr else {
        return;
    };

    // Ignore error if address is already in use
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => info!("Metrics exporter listening on {}", addr),
        Err(e) => warn!("Failed to install Prometheus recorder on {}: {}", addr, e),
    }
}
