//! Speak Commands - 播报命令
//!
//! 一次进程调用对应一条 SpeakCommand

use crate::domain::voice::Gender;
use crate::domain::SegmentConfig;

/// 播报命令
///
/// 参数为调用方传入的原始字符串，校验在 handler 中完成
#[derive(Debug, Clone)]
pub struct SpeakCommand {
    pub text: String,
    /// 语言标签，None 时使用默认语言
    pub language: Option<String>,
    /// 打断按键（"any" 或按键列表），None 表示不可打断
    pub interrupt_keys: Option<String>,
    /// 性别代码 m / f，None 时使用默认性别
    pub gender: Option<String>,
    /// 握手得到的请求标识，只用于日志
    pub request_id: String,
}

/// 播报结果，按键打断属于正常结束
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeakOutcome {
    /// 全部片段播放完毕
    Completed { segments: usize },
    /// 在第 segment_index 个片段被按键打断
    Interrupted { key: char, segment_index: usize },
}

/// 播报设置（来自配置）
#[derive(Debug, Clone)]
pub struct SpeakSettings {
    pub default_language: String,
    pub default_gender: Gender,
    pub segment: SegmentConfig,
    /// 告警同时通过 NOOP 输出到控制端控制台
    pub console_log: bool,
}

impl Default for SpeakSettings {
    fn default() -> Self {
        Self {
            default_language: "en-US".to_string(),
            default_gender: Gender::Female,
            segment: SegmentConfig::default(),
            console_log: false,
        }
    }
}
