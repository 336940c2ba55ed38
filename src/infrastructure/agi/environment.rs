//! 会话握手变量
//!
//! 进程启动时控制端先发送若干 `key: value` 行，以空行结束

use std::collections::HashMap;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::application::ports::ChannelError;

#[derive(Debug, Clone, Default)]
pub struct AgiEnvironment {
    vars: HashMap<String, String>,
}

impl AgiEnvironment {
    /// 读取握手变量，直到空行或 EOF
    pub async fn read_from<R>(reader: &mut R) -> Result<Self, ChannelError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut vars = HashMap::new();
        let mut line = String::new();

        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                break;
            }

            let trimmed = line.trim_end();
            if trimmed.is_empty() {
                break;
            }

            match trimmed.split_once(':') {
                Some((key, value)) => {
                    vars.insert(key.trim().to_string(), value.trim().to_string());
                }
                None => tracing::warn!(line = %trimmed, "Ignoring malformed handshake line"),
            }
        }

        tracing::debug!(count = vars.len(), "Handshake variables received");
        Ok(Self { vars })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// 用于日志的请求标识
    pub fn request_id(&self) -> Option<&str> {
        self.get("agi_uniqueid").or_else(|| self.get("agi_request"))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
