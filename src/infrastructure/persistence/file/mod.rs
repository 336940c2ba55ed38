//! File Persistence - 本地目录中的内容寻址音频缓存

mod audio_cache;

pub use audio_cache::{FileAudioCache, FileCacheConfig, MAX_COMMAND_LINE};
