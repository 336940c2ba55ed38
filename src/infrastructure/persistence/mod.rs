//! Persistence Layer - 数据持久化
//!
//! 跨进程共享的音频缓存

pub mod file;

pub use self::file::FileAudioCache;
