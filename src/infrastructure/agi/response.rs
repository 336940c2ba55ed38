//! 控制端应答行解析
//!
//! 正常应答: `200 result=<int> [附加文本]`
//! 多行错误: 以 `520-` 开头，后面还有一行需要读掉

use once_cell::sync::Lazy;
use regex::Regex;

static RESPONSE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^200 result=(-?\d+)(?:\s+(.*))?$").expect("valid response regex"));

/// 多行错误应答的前缀
pub const MULTILINE_ERROR_PREFIX: &str = "520-";

/// 一条命令的应答
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgiReply {
    Success { code: i32, data: Option<String> },
    /// 格式错误、多行错误或对端关闭
    Failure,
}

impl AgiReply {
    /// 结果码，Failure 为 -1
    pub fn code(&self) -> i32 {
        match self {
            Self::Success { code, .. } => *code,
            Self::Failure => -1,
        }
    }

    pub fn data(&self) -> Option<&str> {
        match self {
            Self::Success { data, .. } => data.as_deref(),
            Self::Failure => None,
        }
    }

    /// 附加文本中括号内的值，如 `(ulaw)` → `ulaw`
    pub fn value(&self) -> Option<&str> {
        let data = self.data()?;
        let start = data.find('(')?;
        let end = data.rfind(')')?;
        (end > start).then(|| &data[start + 1..end])
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure)
    }
}

/// 单行解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Reply(AgiReply),
    /// 需要再读一行续行
    MultiLineError,
    Invalid,
}

pub fn parse_line(line: &str) -> ParsedLine {
    let line = line.trim_end_matches(|c| c == '\r' || c == '\n');

    if line.starts_with(MULTILINE_ERROR_PREFIX) {
        return ParsedLine::MultiLineError;
    }

    let Some(caps) = RESPONSE_LINE.captures(line) else {
        return ParsedLine::Invalid;
    };

    match caps[1].parse::<i32>() {
        Ok(code) => ParsedLine::Reply(AgiReply::Success {
            code,
            data: caps
                .get(2)
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty()),
        }),
        Err(_) => ParsedLine::Invalid,
    }
}
