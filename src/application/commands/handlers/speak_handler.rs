//! Speak Handler - 播报流程编排
//!
//! 校验参数 → 应答 → 检测音频格式 → 逐片段（缓存 / 合成）播放 → 写入缓存

use std::path::Path;
use std::sync::Arc;

use crate::application::commands::speak_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    generate_cache_key, AudioCachePort, AudioStoragePort, CallChannelPort, PlaybackResult,
    SynthesisRequest, TokenProviderPort, TtsEnginePort,
};
use crate::domain::voice::{find_voice, AudioFormat, Gender, InterruptKeys, Language};
use crate::domain::{sanitize_text, segment_text, TextSegment};

/// 校验后的播报参数
#[derive(Debug)]
struct SpeakPlan {
    text: String,
    language: Language,
    gender: Gender,
    voice: &'static str,
    keys: InterruptKeys,
    /// 可恢复的参数问题，已替换为默认值
    warnings: Vec<String>,
}

/// Speak Handler
pub struct SpeakHandler {
    settings: SpeakSettings,
    tts_engine: Arc<dyn TtsEnginePort>,
    token_provider: Arc<dyn TokenProviderPort>,
    audio_cache: Arc<dyn AudioCachePort>,
    storage: Arc<dyn AudioStoragePort>,
}

impl SpeakHandler {
    pub fn new(
        settings: SpeakSettings,
        tts_engine: Arc<dyn TtsEnginePort>,
        token_provider: Arc<dyn TokenProviderPort>,
        audio_cache: Arc<dyn AudioCachePort>,
        storage: Arc<dyn AudioStoragePort>,
    ) -> Self {
        Self {
            settings,
            tts_engine,
            token_provider,
            audio_cache,
            storage,
        }
    }

    /// 校验参数，在任何协议交互和网络请求之前完成
    fn validate(&self, cmd: &SpeakCommand) -> Result<SpeakPlan, ApplicationError> {
        let mut warnings = Vec::new();

        let language_tag = cmd
            .language
            .as_deref()
            .filter(|tag| !tag.trim().is_empty())
            .unwrap_or(self.settings.default_language.as_str());
        let language = Language::parse(language_tag)?;

        let gender = match cmd.gender.as_deref().filter(|code| !code.trim().is_empty()) {
            None => self.settings.default_gender,
            Some(code) => Gender::from_code(code).unwrap_or_else(|| {
                warnings.push(format!(
                    "Invalid gender '{}', using '{}'",
                    code, self.settings.default_gender
                ));
                self.settings.default_gender
            }),
        };

        let keys = match cmd.interrupt_keys.as_deref() {
            Some(raw) => {
                let keys = InterruptKeys::parse(raw);
                if keys.is_empty() && !raw.trim().is_empty() {
                    warnings.push(format!("No valid interrupt keys in '{}'", raw));
                }
                keys
            }
            None => InterruptKeys::none(),
        };

        let text = sanitize_text(&cmd.text)?;
        let voice = find_voice(&language, gender)?;

        Ok(SpeakPlan {
            text,
            language,
            gender,
            voice,
            keys,
            warnings,
        })
    }

    pub async fn handle(
        &self,
        cmd: SpeakCommand,
        channel: &mut dyn CallChannelPort,
    ) -> Result<SpeakOutcome, ApplicationError> {
        let plan = self.validate(&cmd)?;

        for warning in &plan.warnings {
            tracing::warn!(request_id = %cmd.request_id, "{}", warning);
            self.console(channel, warning).await;
        }

        tracing::info!(
            request_id = %cmd.request_id,
            language = %plan.language,
            gender = %plan.gender,
            voice = plan.voice,
            keys = plan.keys.as_str(),
            text_len = plan.text.chars().count(),
            cache_enabled = self.audio_cache.is_enabled(),
            "Speak request accepted"
        );

        channel.ensure_answered().await?;
        let format = channel.detect_format().await?;

        // 令牌在第一次缓存未命中时获取，本次会话内复用
        let mut token = None;
        let mut played = 0;

        for segment in segment_text(&plan.text, &self.settings.segment) {
            let result = self
                .play_segment(channel, &plan, format, segment, &mut token)
                .await?;

            match result {
                PlaybackResult::Completed => played += 1,
                PlaybackResult::Interrupted(key) => {
                    tracing::info!(
                        request_id = %cmd.request_id,
                        segment_index = segment.index,
                        key = %key,
                        "Speak interrupted"
                    );
                    return Ok(SpeakOutcome::Interrupted {
                        key,
                        segment_index: segment.index,
                    });
                }
                PlaybackResult::Failed(reason) => {
                    return Err(ApplicationError::Playback(reason));
                }
            }
        }

        tracing::info!(request_id = %cmd.request_id, segments = played, "Speak completed");
        Ok(SpeakOutcome::Completed { segments: played })
    }

    /// 播放一个片段：命中缓存直接播放，否则合成后播放
    async fn play_segment(
        &self,
        channel: &mut dyn CallChannelPort,
        plan: &SpeakPlan,
        format: AudioFormat,
        segment: TextSegment<'_>,
        token: &mut Option<String>,
    ) -> Result<PlaybackResult, ApplicationError> {
        let cache_key = generate_cache_key(segment.text, &plan.language, plan.gender, format);

        if self.audio_cache.is_enabled() {
            if let Some(path) = self.audio_cache.lookup(&cache_key, format).await {
                tracing::debug!(
                    segment_index = segment.index,
                    cache_hit = true,
                    path = %path.display(),
                    "Playing cached segment"
                );
                return Ok(channel.stream_file(&path, &plan.keys).await?);
            }
        }

        let token = self.session_token(token).await?;
        let request = SynthesisRequest {
            text: segment.text.to_string(),
            language: plan.language.clone(),
            gender: plan.gender,
            voice: plan.voice.to_string(),
            format,
        };
        let audio = self.tts_engine.synthesize(&request, &token).await?;

        tracing::debug!(
            segment_index = segment.index,
            cache_hit = false,
            audio_len = audio.len(),
            "Segment synthesized"
        );

        let temp_path = self.storage.save_audio(segment.index, format, &audio).await?;
        let result = channel.stream_file(&temp_path, &plan.keys).await?;
        self.keep_or_discard(&temp_path, &cache_key, format, &result)
            .await;

        Ok(result)
    }

    /// 取得本次会话的访问令牌，空令牌视为获取失败
    async fn session_token(&self, slot: &mut Option<String>) -> Result<String, ApplicationError> {
        if let Some(token) = slot {
            return Ok(token.clone());
        }

        let token = self.token_provider.get_token().await?;
        if token.is_empty() {
            return Err(ApplicationError::TokenNotIssued);
        }
        *slot = Some(token.clone());
        Ok(token)
    }

    /// 播放过的合成结果写入缓存，播放失败或缓存关闭时删除
    async fn keep_or_discard(
        &self,
        temp_path: &Path,
        cache_key: &str,
        format: AudioFormat,
        result: &PlaybackResult,
    ) {
        let cacheable = !matches!(result, PlaybackResult::Failed(_));

        if cacheable && self.audio_cache.is_enabled() {
            match self.audio_cache.store(temp_path, cache_key, format).await {
                Ok(_) => return,
                Err(e) => {
                    tracing::warn!(cache_key = %cache_key, error = %e, "Failed to store audio in cache");
                }
            }
        }

        if let Err(e) = self.storage.delete_audio(temp_path).await {
            tracing::warn!(path = %temp_path.display(), error = %e, "Failed to delete temp audio");
        }
    }

    /// 在控制端控制台输出一条消息
    async fn console(&self, channel: &mut dyn CallChannelPort, message: &str) {
        if !self.settings.console_log {
            return;
        }
        if let Err(e) = channel.noop(message).await {
            tracing::debug!(error = %e, "Failed to mirror message to console");
        }
    }
}
