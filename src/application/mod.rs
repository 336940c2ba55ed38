//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（TtsEngine、TokenProvider、AudioCache、CallChannel 等）
//! - commands: 播报命令及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;

// Re-exports
pub use commands::{handlers::SpeakHandler, SpeakCommand, SpeakOutcome, SpeakSettings};

pub use error::ApplicationError;

pub use ports::{
    // Audio cache
    generate_cache_key,
    AudioCachePort,
    CacheError,
    // Audio storage
    AudioStorageError,
    AudioStoragePort,
    // Call channel
    CallChannelPort,
    ChannelError,
    PlaybackResult,
    // Token provider
    AccessToken,
    TokenError,
    TokenProviderPort,
    // TTS engine
    SynthesisRequest,
    TtsEnginePort,
    TtsError,
};
