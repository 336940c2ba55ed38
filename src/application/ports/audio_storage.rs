//! Audio Storage Port - 出站端口
//!
//! 会话级临时音频文件。实现需保证会话结束（正常、出错或被信号中断）时清理全部文件

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::voice::AudioFormat;

/// 音频存储错误
#[derive(Debug, Error)]
pub enum AudioStorageError {
    #[error("IO error: {0}")]
    IoError(String),
}

/// Audio Storage Port
#[async_trait]
pub trait AudioStoragePort: Send + Sync {
    /// 写入一个片段的合成结果，返回临时文件路径（带扩展名）
    async fn save_audio(
        &self,
        segment_index: usize,
        format: AudioFormat,
        data: &[u8],
    ) -> Result<PathBuf, AudioStorageError>;

    /// 删除临时文件，文件不存在时视为成功
    async fn delete_audio(&self, path: &Path) -> Result<(), AudioStorageError>;
}
