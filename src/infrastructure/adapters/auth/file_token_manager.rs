//! File Token Manager - 共享文件中的访问令牌
//!
//! 实现 TokenProviderPort
//!
//! 令牌签发 API:
//! POST https://{region}.api.cognitive.microsoft.com/sts/v1.0/issueToken
//! Headers: Ocp-Apim-Subscription-Key: <api key>
//! Response: 原始 bearer 字符串
//!
//! 多个进程共享同一个令牌文件，不加锁：写入临时文件后原子 rename，
//! 读方永远不会看到写了一半的文件；同时刷新时后写者覆盖

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

use crate::application::ports::{AccessToken, TokenError, TokenProviderPort};

/// API key 请求头
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Token 管理器配置
#[derive(Debug, Clone)]
pub struct FileTokenManagerConfig {
    /// 签发接口完整 URL
    pub endpoint: String,
    /// 为空时无法签发令牌
    pub api_key: Option<String>,
    /// 共享令牌文件路径
    pub token_path: PathBuf,
    /// 令牌有效期（秒）
    pub validity_secs: i64,
    /// 过期前多少秒视为不可用
    pub safety_margin_secs: i64,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for FileTokenManagerConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://westus.api.cognitive.microsoft.com/sts/v1.0/issueToken"
                .to_string(),
            api_key: None,
            token_path: PathBuf::from("/var/spool/asterisk/tmp/ivrtts.token"),
            validity_secs: 600,
            safety_margin_secs: 10,
            timeout_secs: 10,
        }
    }
}

/// 写入令牌文件：同目录临时文件 + 原子 rename
fn persist_token(path: &Path, token: &AccessToken) -> std::io::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(token.to_file_content().as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// 文件令牌管理器
pub struct FileTokenManager {
    client: Client,
    config: FileTokenManagerConfig,
}

impl FileTokenManager {
    pub fn new(config: FileTokenManagerConfig) -> Result<Self, TokenError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("ivrtts/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TokenError::ClientError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 读取已持久化的令牌，不存在或格式不对时返回 None
    async fn read_cached(&self) -> Option<AccessToken> {
        let content = tokio::fs::read_to_string(&self.config.token_path).await.ok()?;
        let token = AccessToken::parse(&content);
        if token.is_none() {
            tracing::debug!(path = %self.config.token_path.display(), "Ignoring malformed token file");
        }
        token
    }

    /// 向签发接口请求新令牌（单次尝试）
    async fn issue(&self, api_key: &str) -> Result<String, String> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .header(SUBSCRIPTION_KEY_HEADER, api_key)
            .body("")
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status));
        }

        let token = response.text().await.map_err(|e| e.to_string())?;
        let token = token.trim();
        if token.is_empty() {
            return Err("empty token in response".to_string());
        }
        Ok(token.to_string())
    }
}

#[async_trait]
impl TokenProviderPort for FileTokenManager {
    async fn get_token(&self) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();

        if let Some(cached) = self.read_cached().await {
            if cached.is_usable(now, self.config.safety_margin_secs) {
                tracing::debug!(expires_at = cached.expires_at, "Reusing persisted token");
                return Ok(cached.token);
            }
            tracing::debug!(expires_at = cached.expires_at, "Persisted token expired");
        }

        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(TokenError::NoCredential)?;

        let token = match self.issue(api_key).await {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(url = %self.config.endpoint, error = %e, "Token issuance failed");
                return Ok(String::new());
            }
        };

        let access = AccessToken {
            token,
            expires_at: now + self.config.validity_secs,
        };

        // 文件写入和 fsync 是阻塞操作
        let path = self.config.token_path.clone();
        let content = access.clone();
        let persisted = tokio::task::spawn_blocking(move || persist_token(&path, &content))
            .await
            .unwrap_or_else(|e| Err(std::io::Error::new(std::io::ErrorKind::Other, e)));

        if let Err(e) = persisted {
            tracing::warn!(
                path = %self.config.token_path.display(),
                error = %e,
                "Failed to persist token"
            );
        } else {
            tracing::info!(expires_at = access.expires_at, "New access token issued");
        }

        Ok(access.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    const ISSUE_PATH: &str = "/sts/v1.0/issueToken";

    async fn issue_token(
        State(hits): State<Arc<AtomicUsize>>,
        headers: HeaderMap,
    ) -> (StatusCode, String) {
        let n = hits.fetch_add(1, Ordering::SeqCst) + 1;
        match headers
            .get(SUBSCRIPTION_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            Some("secret") => (StatusCode::OK, format!("token-{}", n)),
            _ => (StatusCode::UNAUTHORIZED, String::new()),
        }
    }

    async fn spawn_issuer() -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route(ISSUE_PATH, post(issue_token))
            .with_state(hits.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}{}", addr, ISSUE_PATH), hits)
    }

    fn config(endpoint: &str, api_key: Option<&str>, token_path: PathBuf) -> FileTokenManagerConfig {
        FileTokenManagerConfig {
            endpoint: endpoint.to_string(),
            api_key: api_key.map(str::to_string),
            token_path,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_token_reused_within_validity() {
        let (endpoint, hits) = spawn_issuer().await;
        let dir = tempdir().unwrap();
        let path = dir.path().join("ivrtts.token");
        let manager = FileTokenManager::new(config(&endpoint, Some("secret"), path.clone())).unwrap();

        let first = manager.get_token().await.unwrap();
        let second = manager.get_token().await.unwrap();

        assert_eq!(first, "token-1");
        assert_eq!(first, second);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let persisted = AccessToken::parse(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(persisted.token, "token-1");
        assert!(persisted.expires_at > Utc::now().timestamp() + 500);
    }

    #[tokio::test]
    async fn test_token_shared_between_instances() {
        let (endpoint, hits) = spawn_issuer().await;
        let dir = tempdir().unwrap();
        let path = dir.path().join("ivrtts.token");

        let a = FileTokenManager::new(config(&endpoint, Some("secret"), path.clone())).unwrap();
        let b = FileTokenManager::new(config(&endpoint, Some("secret"), path)).unwrap();

        assert_eq!(a.get_token().await.unwrap(), b.get_token().await.unwrap());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_token_refreshed() {
        let (endpoint, hits) = spawn_issuer().await;
        let dir = tempdir().unwrap();
        let path = dir.path().join("ivrtts.token");

        // 距过期不足安全余量
        let stale = AccessToken {
            token: "stale".to_string(),
            expires_at: Utc::now().timestamp() + 5,
        };
        std::fs::write(&path, stale.to_file_content()).unwrap();

        let manager = FileTokenManager::new(config(&endpoint, Some("secret"), path.clone())).unwrap();
        assert_eq!(manager.get_token().await.unwrap(), "token-1");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_valid_persisted_token_needs_no_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ivrtts.token");
        let fresh = AccessToken {
            token: "shared".to_string(),
            expires_at: Utc::now().timestamp() + 300,
        };
        std::fs::write(&path, fresh.to_file_content()).unwrap();

        let manager = FileTokenManager::new(config("http://127.0.0.1:9/unused", None, path)).unwrap();
        assert_eq!(manager.get_token().await.unwrap(), "shared");
    }

    #[tokio::test]
    async fn test_no_api_key() {
        let dir = tempdir().unwrap();
        let manager = FileTokenManager::new(config(
            "http://127.0.0.1:9/unused",
            None,
            dir.path().join("ivrtts.token"),
        ))
        .unwrap();

        assert!(matches!(manager.get_token().await, Err(TokenError::NoCredential)));
    }

    #[tokio::test]
    async fn test_issuance_failure_returns_empty_token() {
        let (endpoint, hits) = spawn_issuer().await;
        let dir = tempdir().unwrap();
        let path = dir.path().join("ivrtts.token");
        let manager = FileTokenManager::new(config(&endpoint, Some("wrong"), path.clone())).unwrap();

        assert_eq!(manager.get_token().await.unwrap(), "");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_unwritable_token_path_still_returns_token() {
        let (endpoint, hits) = spawn_issuer().await;
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("ivrtts.token");
        let manager = FileTokenManager::new(config(&endpoint, Some("secret"), path.clone())).unwrap();

        assert_eq!(manager.get_token().await.unwrap(), "token-1");
        assert!(!path.exists());

        // 没有持久化成功，下一次重新签发
        assert_eq!(manager.get_token().await.unwrap(), "token-2");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_out_of_range_expiry_is_refreshed() {
        let (endpoint, hits) = spawn_issuer().await;
        let dir = tempdir().unwrap();
        let path = dir.path().join("ivrtts.token");
        std::fs::write(&path, "expire:-9223372036854775808\ntoken:corrupt\n").unwrap();

        let manager = FileTokenManager::new(config(&endpoint, Some("secret"), path.clone())).unwrap();
        assert_eq!(manager.get_token().await.unwrap(), "token-1");
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let persisted = AccessToken::parse(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(persisted.token, "token-1");
    }

    #[test]
    fn test_persist_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ivrtts.token");
        std::fs::write(&path, "garbage").unwrap();

        let token = AccessToken {
            token: "abc".to_string(),
            expires_at: 42,
        };
        persist_token(&path, &token).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "expire:42\ntoken:abc\n");
        // 临时文件已经被 rename，目录里只剩令牌文件
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
