//! Voice Context - 音色限界上下文
//!
//! 职责:
//! - 语言 / 性别 / 打断按键参数校验
//! - 音频格式选择
//! - 音色查找

mod catalog;
mod errors;
mod value_objects;

pub use catalog::find_voice;
pub use errors::VoiceError;
pub use value_objects::{AudioFormat, Gender, InterruptKeys, Language, ANY_INTERRUPT_KEYS};
