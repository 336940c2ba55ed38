//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（ivrtts.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;
use crate::domain::voice::Language;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径（后者覆盖前者）
const CONFIG_FILE_NAMES: &[&str] = &["/etc/asterisk/ivrtts", "ivrtts", "ivrtts.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `IVRTTS_`，层级分隔符 `__`）
/// 2. 配置文件（/etc/asterisk/ivrtts.toml、当前目录的 ivrtts.toml 或 ivrtts.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `IVRTTS_SPEECH__REGION=eastus`
/// - `IVRTTS_SPEECH__API_KEY=...`
/// - `IVRTTS_CACHE__ENABLED=false`
/// - `IVRTTS_LOG__CONSOLE=true`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("speech.region", "westus")?
        .set_default("speech.timeout_secs", 10)?
        .set_default("speech.default_language", "en-US")?
        .set_default("speech.default_gender", "f")?
        .set_default("speech.max_segment_chars", 1000)?
        .set_default("token.path", "/var/spool/asterisk/tmp/ivrtts.token")?
        .set_default("token.validity_secs", 600)?
        .set_default("token.safety_margin_secs", 10)?
        .set_default("cache.enabled", true)?
        .set_default("cache.dir", "/var/spool/asterisk/tmp/ivrtts")?
        .set_default("log.level", "info")?
        .set_default("log.console", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: IVRTTS_SPEECH__REGION=eastus
    builder = builder.add_source(
        Environment::with_prefix("IVRTTS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.speech.max_segment_chars == 0 {
        return Err(ConfigError::ValidationError(
            "max_segment_chars cannot be 0".to_string(),
        ));
    }

    if config.speech.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Speech timeout cannot be 0".to_string(),
        ));
    }

    if Language::parse(&config.speech.default_language).is_err() {
        return Err(ConfigError::ValidationError(format!(
            "Invalid default language: {}",
            config.speech.default_language
        )));
    }

    if config.token.safety_margin_secs < 0
        || config.token.validity_secs <= config.token.safety_margin_secs
    {
        return Err(ConfigError::ValidationError(format!(
            "Token validity ({}s) must exceed safety margin ({}s)",
            config.token.validity_secs, config.token.safety_margin_secs
        )));
    }

    Ok(())
}

/// 打印配置信息（debug 级别，不输出密钥）
pub fn print_config(config: &AppConfig) {
    tracing::debug!("=== ivrtts Configuration ===");
    tracing::debug!("Region: {}", config.speech.region);
    tracing::debug!("API Key: {}", if config.speech.api_key().is_some() { "set" } else { "not set" });
    tracing::debug!("Token URL: {}", config.speech.token_endpoint());
    tracing::debug!("TTS URL: {}", config.speech.tts_endpoint());
    tracing::debug!("Timeout: {}s", config.speech.timeout_secs);
    tracing::debug!(
        "Defaults: language={} gender={}",
        config.speech.default_language,
        config.speech.default_gender
    );
    tracing::debug!("Token File: {:?}", config.token.path);
    tracing::debug!("Cache Enabled: {}", config.cache.enabled);
    if config.cache.enabled {
        tracing::debug!("Cache Directory: {:?}", config.cache.dir);
    }
    tracing::debug!("Log Level: {}", config.log.level);
    tracing::debug!("============================");
}
