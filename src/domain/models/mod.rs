// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 定义扫描、子域名记录、上游数据以及运行汇总等核心实体
pub mod intelligence;
pub mod run_summary;
pub mod scan;
