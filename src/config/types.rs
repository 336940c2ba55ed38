//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::voice::Gender;
use crate::domain::DEFAULT_MAX_CHARS;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 语音服务配置
    #[serde(default)]
    pub speech: SpeechConfig,

    /// 访问令牌配置
    #[serde(default)]
    pub token: TokenConfig,

    /// 音频缓存配置
    #[serde(default)]
    pub cache: CacheConfig,

    /// 临时文件配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 语音服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    /// 服务区域，用于拼接默认的服务地址
    #[serde(default = "default_region")]
    pub region: String,

    /// 订阅密钥，空字符串视为未配置
    #[serde(default)]
    pub api_key: Option<String>,

    /// 令牌签发地址（覆盖按区域拼接的地址）
    #[serde(default)]
    pub token_url: Option<String>,

    /// 合成地址（覆盖按区域拼接的地址）
    #[serde(default)]
    pub tts_url: Option<String>,

    /// HTTP 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// 未传入语言参数时使用
    #[serde(default = "default_language")]
    pub default_language: String,

    /// 未传入或传入无效性别参数时使用
    #[serde(default = "default_gender")]
    pub default_gender: Gender,

    /// 单次合成的最大字符数
    #[serde(default = "default_max_segment_chars")]
    pub max_segment_chars: usize,
}

fn default_region() -> String {
    "westus".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_gender() -> Gender {
    Gender::Female
}

fn default_max_segment_chars() -> usize {
    DEFAULT_MAX_CHARS
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            api_key: None,
            token_url: None,
            tts_url: None,
            timeout_secs: default_timeout(),
            default_language: default_language(),
            default_gender: default_gender(),
            max_segment_chars: default_max_segment_chars(),
        }
    }
}

impl SpeechConfig {
    /// 已配置的订阅密钥
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// 令牌签发地址
    pub fn token_endpoint(&self) -> String {
        self.token_url.clone().unwrap_or_else(|| {
            format!(
                "https://{}.api.cognitive.microsoft.com/sts/v1.0/issueToken",
                self.region
            )
        })
    }

    /// 合成地址
    pub fn tts_endpoint(&self) -> String {
        self.tts_url.clone().unwrap_or_else(|| {
            format!(
                "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
                self.region
            )
        })
    }
}

/// 访问令牌配置
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    /// 令牌文件路径，多个进程共享
    #[serde(default = "default_token_path")]
    pub path: PathBuf,

    /// 令牌有效期（秒）
    #[serde(default = "default_validity")]
    pub validity_secs: i64,

    /// 提前刷新的余量（秒）
    #[serde(default = "default_safety_margin")]
    pub safety_margin_secs: i64,
}

fn default_token_path() -> PathBuf {
    PathBuf::from("/var/spool/asterisk/tmp/ivrtts.token")
}

fn default_validity() -> i64 {
    600
}

fn default_safety_margin() -> i64 {
    10
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            path: default_token_path(),
            validity_secs: default_validity(),
            safety_margin_secs: default_safety_margin(),
        }
    }
}

/// 音频缓存配置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// 缓存目录，多个进程共享
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("/var/spool/asterisk/tmp/ivrtts")
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            dir: default_cache_dir(),
        }
    }
}

/// 临时文件配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// 会话临时目录的父目录，未设置时使用系统临时目录
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别（RUST_LOG 优先）
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 告警和错误同时输出到控制端控制台
    #[serde(default)]
    pub console: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.speech.region, "westus");
        assert_eq!(config.speech.timeout_secs, 10);
        assert_eq!(config.speech.default_gender, Gender::Female);
        assert_eq!(config.speech.max_segment_chars, 1000);
        assert_eq!(config.token.validity_secs, 600);
        assert!(config.cache.enabled);
        assert!(config.storage.temp_dir.is_none());
    }

    #[test]
    fn test_endpoints_from_region() {
        let config = SpeechConfig {
            region: "eastus".to_string(),
            ..SpeechConfig::default()
        };
        assert_eq!(
            config.token_endpoint(),
            "https://eastus.api.cognitive.microsoft.com/sts/v1.0/issueToken"
        );
        assert_eq!(
            config.tts_endpoint(),
            "https://eastus.tts.speech.microsoft.com/cognitiveservices/v1"
        );
    }

    #[test]
    fn test_endpoint_override() {
        let config = SpeechConfig {
            tts_url: Some("http://127.0.0.1:9000/tts".to_string()),
            ..SpeechConfig::default()
        };
        assert_eq!(config.tts_endpoint(), "http://127.0.0.1:9000/tts");
    }

    #[test]
    fn test_blank_api_key_is_none() {
        let mut config = SpeechConfig::default();
        assert_eq!(config.api_key(), None);
        config.api_key = Some("  ".to_string());
        assert_eq!(config.api_key(), None);
        config.api_key = Some("secret".to_string());
        assert_eq!(config.api_key(), Some("secret"));
    }
}
