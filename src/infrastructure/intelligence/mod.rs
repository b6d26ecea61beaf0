// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 主机情报模块
///
/// 包含 REST 传输层以及带限流、超时和重试的客户端装饰器
pub mod rate_limited_client;
pub mod shodan_source;
