//! Storage Adapter - 会话临时文件

mod file_storage;

pub use file_storage::FileAudioStorage;
