//! TTS Adapter - 语音合成客户端（HTTP 实现 + 测试用 Fake）

mod fake_tts_client;
mod http_tts_client;

pub use fake_tts_client::{FakeTtsClient, FakeTtsClientConfig};
pub use http_tts_client::*;
