//! Call Channel Port - 呼叫控制协议抽象
//!
//! 半双工的请求 / 应答协议：每条命令写出后必须读完应答才能发送下一条

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use crate::domain::voice::{AudioFormat, InterruptKeys};

/// 通道状态码：振铃但未应答
pub const CHANNEL_STATE_RING: i32 = 4;

/// 原生编解码器的通道变量
pub const NATIVE_FORMAT_VARIABLE: &str = "${CHANNEL(audionativeformat)}";

/// 通道错误
#[derive(Debug, Error)]
pub enum ChannelError {
    /// 应答行格式不对或对端已关闭
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Failed to answer channel (result={0})")]
    AnswerFailed(i32),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for ChannelError {
    fn from(err: std::io::Error) -> Self {
        ChannelError::IoError(err.to_string())
    }
}

/// 一次播放的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackResult {
    /// 正常播放完毕
    Completed,
    /// 被按键打断，已把通话跳转到该按键对应的 extension
    Interrupted(char),
    /// 播放失败
    Failed(String),
}

/// Call Channel Port
#[async_trait]
pub trait CallChannelPort: Send {
    /// CHANNEL STATUS
    async fn channel_status(&mut self) -> Result<i32, ChannelError>;

    /// ANSWER，返回结果码（0 表示成功）
    async fn answer(&mut self) -> Result<i32, ChannelError>;

    /// GET FULL VARIABLE，变量未设置时返回 None
    async fn get_full_variable(&mut self, expression: &str)
        -> Result<Option<String>, ChannelError>;

    /// STREAM FILE，按键打断时同时完成 extension / priority 跳转
    async fn stream_file(
        &mut self,
        path: &Path,
        keys: &InterruptKeys,
    ) -> Result<PlaybackResult, ChannelError>;

    /// NOOP，在控制端控制台输出一条消息
    async fn noop(&mut self, message: &str) -> Result<(), ChannelError>;

    /// 通道处于振铃状态时先应答
    async fn ensure_answered(&mut self) -> Result<(), ChannelError> {
        let status = self.channel_status().await?;
        tracing::debug!(status = status, "Channel status");

        if status == CHANNEL_STATE_RING {
            let result = self.answer().await?;
            if result != 0 {
                return Err(ChannelError::AnswerFailed(result));
            }
            tracing::debug!("Channel answered");
        }
        Ok(())
    }

    /// 根据通话原生编解码器选择音频格式
    ///
    /// 查询失败时退回窄带
    async fn detect_format(&mut self) -> Result<AudioFormat, ChannelError> {
        match self.get_full_variable(NATIVE_FORMAT_VARIABLE).await? {
            Some(codec) => {
                let format = AudioFormat::from_native_codec(&codec);
                tracing::debug!(codec = %codec, format = %format, "Detected audio format");
                Ok(format)
            }
            None => {
                tracing::warn!("Native audio format unknown, falling back to narrowband");
                Ok(AudioFormat::Narrowband)
            }
        }
    }
}
