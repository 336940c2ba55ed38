//! ivrtts - 电话 IVR 语音播报
//!
//! 由呼叫控制端以 AGI 方式启动：
//! `ivrtts <text> [language] [interrupt-keys] [gender]`
//!
//! stdin / stdout 为控制协议，日志只写 stderr

use std::ffi::OsString;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::io::{stdin, stdout, BufReader};
use tokio::signal::unix::{signal, Signal, SignalKind};
use uuid::Uuid;

use ivrtts::application::ports::CallChannelPort;
use ivrtts::application::{SpeakCommand, SpeakHandler, SpeakOutcome, SpeakSettings};
use ivrtts::config::{load_config, print_config, AppConfig};
use ivrtts::domain::SegmentConfig;
use ivrtts::infrastructure::adapters::{
    FileAudioStorage, FileTokenManager, FileTokenManagerConfig, HttpTtsClient,
    HttpTtsClientConfig,
};
use ivrtts::infrastructure::persistence::file::{FileAudioCache, FileCacheConfig};
use ivrtts::infrastructure::AgiChannel;

const USAGE: &str = "Usage: ivrtts <text> [language] [interrupt-keys] [gender]";

/// 位置参数
#[derive(Debug, PartialEq, Eq)]
struct Invocation {
    text: String,
    language: Option<String>,
    interrupt_keys: Option<String>,
    gender: Option<String>,
}

fn parse_args(args: impl IntoIterator<Item = OsString>) -> anyhow::Result<Invocation> {
    let mut args = args
        .into_iter()
        .map(|arg| arg.to_string_lossy().into_owned());

    let text = args.next().ok_or_else(|| anyhow!(USAGE))?;
    Ok(Invocation {
        text,
        language: args.next(),
        interrupt_keys: args.next(),
        gender: args.next(),
    })
}

/// 会话期间监听的终止信号
struct ShutdownSignals {
    interrupt: Signal,
    terminate: Signal,
    hangup: Signal,
    pipe: Signal,
}

impl ShutdownSignals {
    fn install() -> std::io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
            pipe: signal(SignalKind::pipe())?,
        })
    }

    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
            _ = self.hangup.recv() => "SIGHUP",
            _ = self.pipe.recv() => "SIGPIPE",
        }
    }
}

fn init_tracing(config: &AppConfig) {
    let log_filter = format!("warn,ivrtts={}", config.log.level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn build_handler(config: &AppConfig) -> anyhow::Result<SpeakHandler> {
    let tts_engine = Arc::new(HttpTtsClient::new(
        HttpTtsClientConfig::new(config.speech.tts_endpoint())
            .with_timeout(config.speech.timeout_secs),
    )?);

    let token_provider = Arc::new(FileTokenManager::new(FileTokenManagerConfig {
        endpoint: config.speech.token_endpoint(),
        api_key: config.speech.api_key().map(str::to_string),
        token_path: config.token.path.clone(),
        validity_secs: config.token.validity_secs,
        safety_margin_secs: config.token.safety_margin_secs,
        timeout_secs: config.speech.timeout_secs,
    })?);

    let audio_cache = Arc::new(FileAudioCache::new(&FileCacheConfig {
        enabled: config.cache.enabled,
        dir: config.cache.dir.clone(),
    }));

    // 会话临时目录，handler 释放时删除
    let storage = Arc::new(FileAudioStorage::new(config.storage.temp_dir.as_deref())?);

    let settings = SpeakSettings {
        default_language: config.speech.default_language.clone(),
        default_gender: config.speech.default_gender,
        segment: SegmentConfig {
            max_chars: config.speech.max_segment_chars,
        },
        console_log: config.log.console,
    };

    Ok(SpeakHandler::new(
        settings,
        tts_engine,
        token_provider,
        audio_cache,
        storage,
    ))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);
    print_config(&config);

    let invocation = parse_args(std::env::args_os().skip(1))?;

    let mut channel = AgiChannel::new(BufReader::new(stdin()), stdout());
    let environment = channel.read_environment().await?;
    let request_id = environment
        .request_id()
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    tracing::info!(
        request_id = %request_id,
        variables = environment.len(),
        "AGI session started"
    );

    let handler = build_handler(&config)?;
    let cmd = SpeakCommand {
        text: invocation.text,
        language: invocation.language,
        interrupt_keys: invocation.interrupt_keys,
        gender: invocation.gender,
        request_id: request_id.clone(),
    };

    // 信号到达时会话在当前等待点被取消，临时目录随 handler 一起释放
    let mut signals = ShutdownSignals::install()?;
    let result = tokio::select! {
        result = handler.handle(cmd, &mut channel) => result,
        name = signals.recv() => {
            tracing::warn!(request_id = %request_id, signal = name, "Interrupted by signal");
            return Err(anyhow!("Interrupted by signal {}", name));
        }
    };

    match result {
        Ok(SpeakOutcome::Completed { segments }) => {
            tracing::debug!(request_id = %request_id, segments = segments, "Session finished");
            Ok(())
        }
        Ok(SpeakOutcome::Interrupted { key, .. }) => {
            tracing::debug!(request_id = %request_id, key = %key, "Session finished by keypress");
            Ok(())
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Session failed");
            if config.log.console {
                let _ = channel.noop(&format!("ivrtts: {}", e)).await;
            }
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<OsString> {
        values.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_parse_all_arguments() {
        let invocation = parse_args(args(&["Hello", "de-DE", "any", "m"])).unwrap();
        assert_eq!(
            invocation,
            Invocation {
                text: "Hello".to_string(),
                language: Some("de-DE".to_string()),
                interrupt_keys: Some("any".to_string()),
                gender: Some("m".to_string()),
            }
        );
    }

    #[test]
    fn test_optional_arguments_missing() {
        let invocation = parse_args(args(&["Hello"])).unwrap();
        assert_eq!(invocation.language, None);
        assert_eq!(invocation.interrupt_keys, None);
        assert_eq!(invocation.gender, None);
    }

    #[test]
    fn test_text_required() {
        assert!(parse_args(args(&[])).is_err());
    }

    #[tokio::test]
    async fn test_hangup_is_reported() {
        let mut signals = ShutdownSignals::install().unwrap();

        let status = std::process::Command::new("kill")
            .arg("-HUP")
            .arg(std::process::id().to_string())
            .status()
            .unwrap();
        assert!(status.success());

        let name = tokio::time::timeout(std::time::Duration::from_secs(5), signals.recv())
            .await
            .unwrap();
        assert_eq!(name, "SIGHUP");
    }
}
