//! Voice Context - Value Objects

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::VoiceError;

/// 语言标签格式: xx-YY
static LANGUAGE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{2}-[A-Z]{2}$").expect("valid language tag regex"));

/// 语言标签（如 en-US、zh-CN）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Language(String);

impl Language {
    pub fn parse(tag: &str) -> Result<Self, VoiceError> {
        let tag = tag.trim();
        if !LANGUAGE_TAG.is_match(tag) {
            return Err(VoiceError::InvalidLanguage(tag.to_string()));
        }
        Ok(Self(tag.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 发音人性别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Gender {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
}

impl Gender {
    /// 从参数代码解析（m / f，不区分大小写）
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "m" => Some(Self::Male),
            "f" => Some(Self::Female),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Male => "m",
            Self::Female => "f",
        }
    }

    /// SSML xml:gender 属性值
    pub fn ssml_name(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// "any" 对应的打断按键
pub const ANY_INTERRUPT_KEYS: &str = "0123456789*#";

/// 打断按键集合
///
/// 不变量: 只包含 0-9、*、#，且不重复
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterruptKeys(String);

impl InterruptKeys {
    /// 解析按键参数
    ///
    /// - "any" → 全部数字键 + * + #
    /// - 其他 → 只保留合法按键字符
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("any") {
            return Self(ANY_INTERRUPT_KEYS.to_string());
        }

        let mut keys = String::new();
        for ch in raw.chars() {
            if ANY_INTERRUPT_KEYS.contains(ch) && !keys.contains(ch) {
                keys.push(ch);
            }
        }
        Self(keys)
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 窄带编解码器白名单（8kHz 通话）
const NARROWBAND_CODECS: &[&str] = &[
    "ulaw", "alaw", "gsm", "g729", "g723", "g726", "g726aal2", "adpcm", "ilbc", "lpc10",
    "speex", "slin", "sln",
];

/// 音频格式
///
/// 原始无头 16bit 单声道 PCM，采样率由通话编解码器决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    /// 8kHz
    Narrowband,
    /// 16kHz
    Wideband,
}

impl AudioFormat {
    /// 所有扩展名中的最大长度（用于缓存路径长度检查）
    pub const MAX_EXTENSION_LEN: usize = 5;

    /// 根据通话原生编解码器选择格式
    ///
    /// 多个编解码器时（如 "(ulaw|alaw)"）以第一个为准
    pub fn from_native_codec(codec: &str) -> Self {
        let first = codec
            .trim()
            .trim_matches(|c| c == '(' || c == ')')
            .split('|')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        if NARROWBAND_CODECS.contains(&first.as_str()) {
            Self::Narrowband
        } else {
            Self::Wideband
        }
    }

    /// TTS 服务的输出格式标识
    pub fn output_format(&self) -> &'static str {
        match self {
            Self::Narrowband => "raw-8khz-16bit-mono-pcm",
            Self::Wideband => "raw-16khz-16bit-mono-pcm",
        }
    }

    /// 播放端识别的文件扩展名
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Narrowband => "sln",
            Self::Wideband => "sln16",
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.output_format())
    }
}
