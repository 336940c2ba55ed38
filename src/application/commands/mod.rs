//! 应用层 - 命令
//!
//! 一次调用 = 一条播报命令

mod speak_commands;

pub mod handlers;

pub use speak_commands::*;
