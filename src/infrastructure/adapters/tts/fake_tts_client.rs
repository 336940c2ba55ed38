//! Fake TTS Client - 用于测试的 TTS 客户端
//!
//! 始终返回固定的音频数据，不实际调用 TTS 服务

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::application::ports::{SynthesisRequest, TtsEnginePort, TtsError};

/// Fake TTS Client 配置
#[derive(Debug, Clone)]
pub struct FakeTtsClientConfig {
    /// 固定返回的音频数据
    pub audio_data: Vec<u8>,
    /// 设置后所有请求都以该状态码失败
    pub fail_with_status: Option<u16>,
}

impl Default for FakeTtsClientConfig {
    fn default() -> Self {
        Self {
            // 100ms 静音（8kHz 16bit）
            audio_data: vec![0u8; 1600],
            fail_with_status: None,
        }
    }
}

/// Fake TTS Client
///
/// 记录调用次数和收到的文本、令牌，便于测试断言
pub struct FakeTtsClient {
    config: FakeTtsClientConfig,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, String)>>,
}

impl FakeTtsClient {
    pub fn new(config: FakeTtsClientConfig) -> Self {
        Self {
            config,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 使用默认配置创建
    pub fn with_defaults() -> Self {
        Self::new(FakeTtsClientConfig::default())
    }

    /// 已收到的合成请求数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 已收到的 (文本, 令牌)
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TtsEnginePort for FakeTtsClient {
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
        token: &str,
    ) -> Result<Vec<u8>, TtsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((request.text.clone(), token.to_string()));
        }

        tracing::debug!(
            text_len = request.text.len(),
            voice = %request.voice,
            "FakeTtsClient: returning fixed audio"
        );

        if let Some(status) = self.config.fail_with_status {
            return Err(TtsError::RequestFailed {
                status,
                reason: "Fake failure".to_string(),
            });
        }

        Ok(self.config.audio_data.clone())
    }
}
