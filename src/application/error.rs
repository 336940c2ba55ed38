//! 应用层错误定义
//!
//! 会话中所有致命错误的统一类型；按键打断不是错误

use thiserror::Error;

use crate::application::ports::{AudioStorageError, ChannelError, TokenError, TtsError};
use crate::domain::voice::VoiceError;
use crate::domain::SegmentError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 输入参数无效（语言、文本、音色），在任何网络请求之前失败
    #[error("Invalid input: {0}")]
    InputValidation(String),

    /// 控制端应答异常
    #[error("Channel protocol error: {0}")]
    ChannelProtocol(String),

    /// 应答通道失败
    #[error("Failed to answer channel: {0}")]
    ChannelAnswer(String),

    #[error("No API key configured")]
    NoCredential,

    #[error("Failed to obtain access token")]
    TokenNotIssued,

    /// 合成请求失败，不重试
    #[error("Synthesis request failed: {0}")]
    SynthesisRequest(String),

    #[error("Playback failed: {0}")]
    Playback(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<VoiceError> for ApplicationError {
    fn from(err: VoiceError) -> Self {
        Self::InputValidation(err.to_string())
    }
}

impl From<SegmentError> for ApplicationError {
    fn from(err: SegmentError) -> Self {
        Self::InputValidation(err.to_string())
    }
}

impl From<ChannelError> for ApplicationError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::AnswerFailed(_) => Self::ChannelAnswer(err.to_string()),
            ChannelError::Protocol(msg) => Self::ChannelProtocol(msg),
            ChannelError::IoError(msg) => Self::Io(msg),
        }
    }
}

impl From<TokenError> for ApplicationError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::NoCredential => Self::NoCredential,
            TokenError::ClientError(_) => Self::TokenNotIssued,
        }
    }
}

impl From<TtsError> for ApplicationError {
    fn from(err: TtsError) -> Self {
        Self::SynthesisRequest(err.to_string())
    }
}

impl From<AudioStorageError> for ApplicationError {
    fn from(err: AudioStorageError) -> Self {
        Self::Io(err.to_string())
    }
}
