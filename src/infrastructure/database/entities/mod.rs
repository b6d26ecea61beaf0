// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据库实体模块
///
/// 定义 `scans` 与 `scan_details` 两张表的 SeaORM 实体
pub mod scan;
pub mod scan_detail;
