// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::run_summary::RejectedRow;
use crate::utils::validators::validate_domain;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

/// 域名源错误
#[derive(Error, Debug)]
pub enum SourceError {
    /// 文件无法读取
    #[error("failed to read domain list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 解析后的域名列表
#[derive(Debug, Clone, Default)]
pub struct DomainList {
    /// 按输入顺序排列的合法域名
    pub domains: Vec<String>,
    /// 未通过校验的行
    pub rejected: Vec<RejectedRow>,
}

/// 基于文件的域名源
///
/// `.csv` 与 `.tsv` 文件按表格处理：首行是表头，取每行第一列；
/// 其他文件每行一个域名。空行与 `#` 开头的注释行会被忽略。
pub struct FileDomainSource {
    path: PathBuf,
}

impl FileDomainSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 是否为表格文件
    pub fn is_tabular(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("tsv"))
            .unwrap_or(false)
    }

    /// 读取并校验域名列表
    pub async fn load(&self) -> Result<DomainList, SourceError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;

        let list = parse_domain_list(&content, self.is_tabular());
        info!(
            "Loaded {} domains from {} ({} rejected)",
            list.domains.len(),
            self.path.display(),
            list.rejected.len()
        );
        Ok(list)
    }
}

/// 解析域名列表文本
pub fn parse_domain_list(content: &str, tabular: bool) -> DomainList {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut list = DomainList::default();

    // 表格文件的第一条记录是表头
    let skip = usize::from(tabular);
    for (index, line) in content.lines().enumerate().skip(skip) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let field = if tabular {
            first_field(trimmed)
        } else {
            trimmed
        };

        match validate_domain(field) {
            Ok(domain) => list.domains.push(domain),
            Err(error) => {
                warn!("Skipping line {} ({:?}): {}", index + 1, field, error);
                list.rejected.push(RejectedRow {
                    line: index + 1,
                    value: field.to_string(),
                    error,
                });
            }
        }
    }

    list
}

fn first_field(row: &str) -> &str {
    row.split([',', '\t', ';']).next().unwrap_or("")
}
