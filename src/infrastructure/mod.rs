//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod agi;
pub mod persistence;

pub use agi::{AgiChannel, AgiEnvironment};
pub use persistence::FileAudioCache;
