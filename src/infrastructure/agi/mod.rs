//! AGI Adapter - 呼叫控制协议实现

mod channel;
mod environment;
mod response;

pub use channel::AgiChannel;
pub use environment::AgiEnvironment;
pub use response::{parse_line, AgiReply, ParsedLine, MULTILINE_ERROR_PREFIX};
