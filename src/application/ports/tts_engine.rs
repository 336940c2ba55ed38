//! TTS Engine Port - 语音合成抽象
//!
//! 定义语音合成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::voice::{AudioFormat, Gender, Language};

/// TTS 错误
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    /// 服务返回非成功状态码
    #[error("Synthesis request failed: HTTP {status} {reason}")]
    RequestFailed { status: u16, reason: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 单个片段的合成请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// 已清洗的片段文本
    pub text: String,
    pub language: Language,
    pub gender: Gender,
    /// 服务端音色名
    pub voice: String,
    pub format: AudioFormat,
}

/// TTS Engine Port
///
/// 外部语音合成服务的抽象接口
#[async_trait]
pub trait TtsEnginePort: Send + Sync {
    /// 合成一个片段，返回原始音频字节
    async fn synthesize(&self, request: &SynthesisRequest, token: &str)
        -> Result<Vec<u8>, TtsError>;
}
