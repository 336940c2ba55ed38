//! AGI Channel - 基于行的呼叫控制协议
//!
//! 实现 CallChannelPort。严格半双工：写一条命令，读一条应答，再写下一条

use async_trait::async_trait;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::environment::AgiEnvironment;
use super::response::{parse_line, AgiReply, ParsedLine};
use crate::application::ports::{CallChannelPort, ChannelError, PlaybackResult};
use crate::domain::voice::InterruptKeys;

/// 把 STREAM FILE 的结果码映射为按键字符（可打印 ASCII）
fn interrupt_key(code: i32) -> Option<char> {
    if (32..127).contains(&code) {
        char::from_u32(code as u32)
    } else {
        None
    }
}

/// NOOP 消息里不能出现换行和双引号
fn console_safe(message: &str) -> String {
    message
        .chars()
        .map(|c| match c {
            '"' => '\'',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect()
}

/// AGI 通道
///
/// reader / writer 通常是进程的 stdin / stdout，测试中使用内存缓冲
pub struct AgiChannel<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> AgiChannel<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }

    /// 读取握手变量（必须在第一条命令之前调用）
    pub async fn read_environment(&mut self) -> Result<AgiEnvironment, ChannelError> {
        AgiEnvironment::read_from(&mut self.reader).await
    }

    async fn read_line(&mut self) -> Result<Option<String>, ChannelError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    async fn read_reply(&mut self) -> Result<AgiReply, ChannelError> {
        let Some(line) = self.read_line().await? else {
            tracing::warn!("Controller closed the connection");
            return Ok(AgiReply::Failure);
        };

        match parse_line(&line) {
            ParsedLine::Reply(reply) => Ok(reply),
            ParsedLine::MultiLineError => {
                let detail = self.read_line().await?.unwrap_or_default();
                tracing::warn!(
                    line = %line.trim_end(),
                    detail = %detail.trim_end(),
                    "Controller rejected command"
                );
                Ok(AgiReply::Failure)
            }
            ParsedLine::Invalid => {
                tracing::warn!(line = %line.trim_end(), "Unexpected controller response");
                Ok(AgiReply::Failure)
            }
        }
    }

    /// 发送一条命令并读取应答
    pub async fn execute(&mut self, command: &str) -> Result<AgiReply, ChannelError> {
        tracing::debug!(command = %command, "AGI >>");

        self.writer.write_all(command.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        let reply = self.read_reply().await?;
        tracing::debug!(reply = ?reply, "AGI <<");
        Ok(reply)
    }

    pub async fn set_extension(&mut self, extension: char) -> Result<AgiReply, ChannelError> {
        self.execute(&format!("SET EXTENSION {}", extension)).await
    }

    pub async fn set_priority(&mut self, priority: u32) -> Result<AgiReply, ChannelError> {
        self.execute(&format!("SET PRIORITY {}", priority)).await
    }

    /// 按键打断后跳转到按键对应的 extension，priority 1
    async fn jump_to_extension(&mut self, key: char) -> Result<(), ChannelError> {
        if self.set_extension(key).await?.is_failure() {
            tracing::warn!(key = %key, "SET EXTENSION failed");
        }
        if self.set_priority(1).await?.is_failure() {
            tracing::warn!(key = %key, "SET PRIORITY failed");
        }
        Ok(())
    }
}

#[async_trait]
impl<R, W> CallChannelPort for AgiChannel<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn channel_status(&mut self) -> Result<i32, ChannelError> {
        match self.execute("CHANNEL STATUS").await? {
            AgiReply::Success { code, .. } if code >= 0 => Ok(code),
            reply => Err(ChannelError::Protocol(format!(
                "CHANNEL STATUS returned {:?}",
                reply
            ))),
        }
    }

    async fn answer(&mut self) -> Result<i32, ChannelError> {
        Ok(self.execute("ANSWER").await?.code())
    }

    async fn get_full_variable(
        &mut self,
        expression: &str,
    ) -> Result<Option<String>, ChannelError> {
        let reply = self
            .execute(&format!("GET FULL VARIABLE {}", expression))
            .await?;

        match reply.code() {
            1 => Ok(reply.value().map(str::to_string)),
            0 => Ok(None),
            code => {
                tracing::warn!(expression = %expression, code = code, "GET FULL VARIABLE failed");
                Ok(None)
            }
        }
    }

    async fn stream_file(
        &mut self,
        path: &Path,
        keys: &InterruptKeys,
    ) -> Result<PlaybackResult, ChannelError> {
        // 播放端自行根据扩展名选择格式，命令中不带扩展名
        let target = path.with_extension("");
        let reply = self
            .execute(&format!(
                "STREAM FILE {} \"{}\"",
                target.display(),
                keys.as_str()
            ))
            .await?;

        let code = match reply {
            AgiReply::Failure => {
                return Ok(PlaybackResult::Failed(format!(
                    "Failed to stream {}",
                    target.display()
                )))
            }
            AgiReply::Success { code, .. } => code,
        };

        if code < 0 {
            return Ok(PlaybackResult::Failed(format!(
                "STREAM FILE {} returned {}",
                target.display(),
                code
            )));
        }

        match interrupt_key(code) {
            Some(key) => {
                tracing::info!(key = %key, "Playback interrupted by caller");
                self.jump_to_extension(key).await?;
                Ok(PlaybackResult::Interrupted(key))
            }
            None => Ok(PlaybackResult::Completed),
        }
    }

    async fn noop(&mut self, message: &str) -> Result<(), ChannelError> {
        self.execute(&format!("NOOP \"{}\"", console_safe(message)))
            .await?;
        Ok(())
    }
}
