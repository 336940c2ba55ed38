//! HTTP TTS Client - 调用远程语音合成服务
//!
//! 实现 TtsEnginePort trait
//!
//! 外部 TTS API:
//! POST https://{region}.tts.speech.microsoft.com/cognitiveservices/v1
//! Request: SSML (application/ssml+xml)
//! Headers: X-Microsoft-OutputFormat, Authorization: Bearer <token>
//! Response: 原始 PCM 音频

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;

use crate::application::ports::{SynthesisRequest, TtsEnginePort, TtsError};

/// 输出格式请求头
const OUTPUT_FORMAT_HEADER: &str = "X-Microsoft-OutputFormat";

/// HTTP TTS 客户端配置
#[derive(Debug, Clone)]
pub struct HttpTtsClientConfig {
    /// 合成接口完整 URL
    pub endpoint: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpTtsClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://westus.tts.speech.microsoft.com/cognitiveservices/v1".to_string(),
            timeout_secs: 10,
        }
    }
}

impl HttpTtsClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// XML 转义
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// 构建 SSML 请求体
pub fn build_ssml(request: &SynthesisRequest) -> String {
    format!(
        "<speak version='1.0' xml:lang='{lang}'>\
         <voice xml:lang='{lang}' xml:gender='{gender}' name='{voice}'>{text}</voice>\
         </speak>",
        lang = request.language,
        gender = request.gender.ssml_name(),
        voice = escape_xml(&request.voice),
        text = escape_xml(&request.text),
    )
}

/// HTTP TTS 客户端
pub struct HttpTtsClient {
    client: Client,
    config: HttpTtsClientConfig,
}

impl HttpTtsClient {
    /// 创建新的 HTTP TTS 客户端
    pub fn new(config: HttpTtsClientConfig) -> Result<Self, TtsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("ivrtts/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl TtsEnginePort for HttpTtsClient {
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
        token: &str,
    ) -> Result<Vec<u8>, TtsError> {
        let body = build_ssml(request);

        tracing::debug!(
            url = %self.config.endpoint,
            text_len = request.text.len(),
            voice = %request.voice,
            format = %request.format,
            "Sending TTS synthesis request"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .header(CONTENT_TYPE, "application/ssml+xml")
            .header(OUTPUT_FORMAT_HEADER, request.format.output_format())
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else if e.is_connect() {
                    TtsError::NetworkError(format!("Cannot connect to TTS service: {}", e))
                } else {
                    TtsError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TtsError::RequestFailed {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| TtsError::InvalidResponse(format!("Failed to read audio: {}", e)))?
            .to_vec();

        if audio_data.is_empty() {
            return Err(TtsError::InvalidResponse("Empty audio body".to_string()));
        }

        tracing::info!(
            audio_size = audio_data.len(),
            format = %request.format,
            "TTS synthesis completed"
        );

        Ok(audio_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::voice::{AudioFormat, Gender, Language};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::Router;

    fn request(text: &str) -> SynthesisRequest {
        SynthesisRequest {
            text: text.to_string(),
            language: Language::parse("en-US").unwrap(),
            gender: Gender::Female,
            voice: "en-US-JennyNeural".to_string(),
            format: AudioFormat::Narrowband,
        }
    }

    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn synthesize_ok(headers: HeaderMap, body: String) -> (StatusCode, Vec<u8>) {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some("Bearer tok-1");
        let ssml = headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            == Some("application/ssml+xml");
        let format = headers
            .get(OUTPUT_FORMAT_HEADER)
            .and_then(|v| v.to_str().ok())
            == Some("raw-8khz-16bit-mono-pcm");

        if !authorized {
            return (StatusCode::UNAUTHORIZED, Vec::new());
        }
        if !ssml || !format || !body.contains("name='en-US-JennyNeural'") {
            return (StatusCode::BAD_REQUEST, Vec::new());
        }
        (StatusCode::OK, vec![1, 2, 3, 4])
    }

    #[test]
    fn test_config_builder() {
        let config = HttpTtsClientConfig::new("http://example.com:9000/tts").with_timeout(3);
        assert_eq!(config.endpoint, "http://example.com:9000/tts");
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn test_ssml_escapes_text() {
        let ssml = build_ssml(&request("Tom & Jerry's \"show\""));
        assert!(ssml.starts_with("<speak version='1.0' xml:lang='en-US'>"));
        assert!(ssml.contains("xml:gender='Female'"));
        assert!(ssml.contains("Tom &amp; Jerry&apos;s &quot;show&quot;"));
        assert!(ssml.ends_with("</voice></speak>"));
    }

    #[tokio::test]
    async fn test_synthesize_returns_audio() {
        let base = spawn_server(Router::new().route("/cognitiveservices/v1", post(synthesize_ok))).await;
        let client =
            HttpTtsClient::new(HttpTtsClientConfig::new(format!("{}/cognitiveservices/v1", base)))
                .unwrap();

        let audio = client.synthesize(&request("Hello"), "tok-1").await.unwrap();
        assert_eq!(audio, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_synthesize_http_error() {
        let base = spawn_server(Router::new().route("/cognitiveservices/v1", post(synthesize_ok))).await;
        let client =
            HttpTtsClient::new(HttpTtsClientConfig::new(format!("{}/cognitiveservices/v1", base)))
                .unwrap();

        let err = client.synthesize(&request("Hello"), "expired").await.unwrap_err();
        match err {
            TtsError::RequestFailed { status, reason } => {
                assert_eq!(status, 401);
                assert_eq!(reason, "Unauthorized");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_synthesize_connection_refused() {
        // 绑定后立即释放端口，保证无人监听
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpTtsClient::new(HttpTtsClientConfig::new(format!("http://{}/tts", addr)))
            .unwrap();
        let err = client.synthesize(&request("Hello"), "tok-1").await.unwrap_err();
        assert!(matches!(err, TtsError::NetworkError(_)));
    }
}
