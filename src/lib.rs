// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体、服务和仓库接口
pub mod domain;

/// 基础设施模块
///
/// 提供外部服务集成，如数据库、主机情报服务、域名源等
pub mod infrastructure;

/// 工具模块
///
/// 提供重试策略、输入校验与日志初始化
pub mod utils;

/// 工作器模块
///
/// 实现流水线编排
pub mod workers;
