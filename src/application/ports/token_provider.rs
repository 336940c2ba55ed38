//! Token Provider Port - 访问令牌管理
//!
//! 令牌持久化在共享文件中，多个进程实例复用同一个有效令牌

use async_trait::async_trait;
use thiserror::Error;

/// Token 错误
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("No API key configured")]
    NoCredential,

    #[error("HTTP client error: {0}")]
    ClientError(String),
}

/// 访问令牌
///
/// 文件格式（两行）:
/// ```text
/// expire:<unix 秒>
/// token:<bearer 字符串>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    /// 过期时间（unix 秒）
    pub expires_at: i64,
}

impl AccessToken {
    /// 解析令牌文件内容，格式不对返回 None
    pub fn parse(content: &str) -> Option<Self> {
        let mut expires_at = None;
        let mut token = None;

        for line in content.lines() {
            if let Some(value) = line.strip_prefix("expire:") {
                expires_at = value.trim().parse::<i64>().ok();
            } else if let Some(value) = line.strip_prefix("token:") {
                token = Some(value.trim().to_string());
            }
        }

        match (token, expires_at) {
            (Some(token), Some(expires_at)) if !token.is_empty() => {
                Some(Self { token, expires_at })
            }
            _ => None,
        }
    }

    pub fn to_file_content(&self) -> String {
        format!("expire:{}\ntoken:{}\n", self.expires_at, self.token)
    }

    /// now < expires_at - margin 时可用，溢出视为不可用
    pub fn is_usable(&self, now: i64, safety_margin_secs: i64) -> bool {
        self.expires_at
            .checked_sub(safety_margin_secs)
            .map_or(false, |limit| now < limit)
    }
}

/// Token Provider Port
#[async_trait]
pub trait TokenProviderPort: Send + Sync {
    /// 获取有效令牌
    ///
    /// - 未配置 API key → `Err(NoCredential)`
    /// - 签发失败 → `Ok("")`，调用方视为未取得令牌
    async fn get_token(&self) -> Result<String, TokenError>;
}
