//! Audio Cache Port - 音频缓存管理
//!
//! 定义音频缓存的抽象接口，具体实现为本地目录中的内容寻址文件

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::voice::{AudioFormat, Gender, Language};

/// Audio Cache 错误
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache disabled")]
    Disabled,

    #[error("IO error: {0}")]
    IoError(String),
}

/// 缓存 key 的长度（md5 十六进制）
pub const CACHE_KEY_LEN: usize = 32;

/// Audio Cache Port
///
/// 缓存 key: md5(text, language, gender, format)
/// 文件存在即有效，不过期、不淘汰
#[async_trait]
pub trait AudioCachePort: Send + Sync {
    /// 本次会话是否启用缓存
    fn is_enabled(&self) -> bool;

    /// 查找缓存文件，未命中返回 None
    async fn lookup(&self, cache_key: &str, format: AudioFormat) -> Option<PathBuf>;

    /// 把临时文件移动到缓存中，返回缓存文件路径
    ///
    /// 同一个 key 重复存储时覆盖已有文件
    async fn store(
        &self,
        temp_path: &Path,
        cache_key: &str,
        format: AudioFormat,
    ) -> Result<PathBuf, CacheError>;
}

/// 生成缓存 key
///
/// 各字段之间以 0x1F 分隔，避免字段间字符移动产生相同的摘要
pub fn generate_cache_key(
    text: &str,
    language: &Language,
    gender: Gender,
    format: AudioFormat,
) -> String {
    let material = format!(
        "{}\u{1f}{}\u{1f}{}\u{1f}{}",
        text,
        language,
        gender.code(),
        format.output_format()
    );
    format!("{:x}", md5::compute(material.as_bytes()))
}
