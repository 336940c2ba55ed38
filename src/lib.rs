//! ivrtts - 电话 IVR 语音播报
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Voice Context: 语言、性别、打断按键、音频格式、音色目录
//! - 文本清洗与分段
//!
//! 应用层 (application/):
//! - Ports: 端口定义（CallChannel, TokenProvider, AudioCache, AudioStorage, TtsEngine）
//! - Commands: 播报命令及处理器
//!
//! 基础设施层 (infrastructure/):
//! - AGI: 基于 stdin / stdout 的呼叫控制协议
//! - Adapters: TTS Client, Token Manager, 会话临时文件
//! - Persistence: 共享音频缓存目录

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
