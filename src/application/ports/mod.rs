//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_cache;
mod audio_storage;
mod call_channel;
mod token_provider;
mod tts_engine;

pub use audio_cache::{generate_cache_key, AudioCachePort, CacheError, CACHE_KEY_LEN};
pub use audio_storage::{AudioStorageError, AudioStoragePort};
pub use call_channel::{
    CallChannelPort, ChannelError, PlaybackResult, CHANNEL_STATE_RING, NATIVE_FORMAT_VARIABLE,
};
pub use token_provider::{AccessToken, TokenError, TokenProviderPort};
pub use tts_engine::{SynthesisRequest, TtsEnginePort, TtsError};
