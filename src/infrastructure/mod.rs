// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施模块
///
/// 提供外部服务集成：数据库、主机情报服务、域名源与指标导出

/// 数据库连接与实体
pub mod database;
/// 域名源
pub mod domain_source;
/// 主机情报服务
pub mod intelligence;
/// 指标导出
pub mod metrics;
/// 仓库实现
pub mod repositories;
