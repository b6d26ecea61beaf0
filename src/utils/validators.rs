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

use thiserror::Error;

/// 域名最大长度
const MAX_DOMAIN_LEN: usize = 253;
/// 单个标签最大长度
const MAX_LABEL_LEN: usize = 63;

/// 验证错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// 域名为空
    #[error("empty domain name")]
    EmptyDomain,
    /// 域名过长
    #[error("domain name longer than 253 characters")]
    DomainTooLong,
    /// 标签无效
    #[error("invalid label {0:?}")]
    InvalidLabel(String),
}

/// 验证并规范化域名
///
/// 去除首尾空白、引号与末尾的点，并转为小写。
/// 单标签名称（如 `intranet`）也是合法输入，是否存在由上游判断。
///
/// # 参数
///
/// * `raw` - 原始输入
///
/// # 返回值
///
/// * `Ok(String)` - 规范化后的域名
/// * `Err(ValidationError)` - 域名无效
pub fn validate_domain(raw: &str) -> Result<String, ValidationError> {
    let name = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .trim_end_matches('.')
        .to_ascii_lowercase();

    if name.is_empty() {
        return Err(ValidationError::EmptyDomain);
    }
    if name.len() > MAX_DOMAIN_LEN {
        return Err(ValidationError::DomainTooLong);
    }

    for label in name.split('.') {
        if !is_valid_label(label) {
            return Err(ValidationError::InvalidLabel(label.to_string()));
        }
    }

    Ok(name)
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
