//! Auth Adapter - 访问令牌签发与共享

mod file_token_manager;

pub use file_token_manager::{FileTokenManager, FileTokenManagerConfig};
