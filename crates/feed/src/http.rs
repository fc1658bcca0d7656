use async_trait::async_trait;
use encoding_rs::Encoding;
use fxrank_core::config::FetchConfig;
use fxrank_core::quote::error::SourceError;
use fxrank_core::quote::port::{PageFetcher, PageRequest};
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en;q=0.8";

/// # Summary
/// 基于 reqwest 的页面抓取器实现。
///
/// # Invariants
/// - 仅执行 GET 请求，失败按固定间隔线性重试。
/// - 非 2xx 状态码视为一次失败的尝试。
#[derive(Clone)]
pub struct HttpFetcher {
    /// 内部使用的 HTTP 客户端
    client: Client,
    /// 最大尝试次数（至少 1 次）
    max_retries: u32,
    /// 两次尝试之间的固定等待
    retry_delay: Duration,
    /// 依次尝试的候选编码
    encodings: Vec<&'static Encoding>,
}

impl HttpFetcher {
    /// # Summary
    /// 根据抓取配置创建 HttpFetcher。
    ///
    /// # Logic
    /// 1. 安装 rustls 的 ring 加密后端（已安装则跳过）。
    /// 2. 设置伪装浏览器的默认请求头与单次请求超时。
    /// 3. 将配置中的编码标签解析为 `encoding_rs` 编码，忽略无法识别的标签。
    ///
    /// # Arguments
    /// * `config`: 抓取配置。
    ///
    /// # Returns
    /// 成功返回 HttpFetcher，客户端构建失败返回 `SourceError::Unknown`。
    pub fn new(config: &FetchConfig) -> Result<Self, SourceError> {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            debug!("rustls crypto provider already installed");
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE),
        );

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| SourceError::Unknown(format!("Failed to build HTTP client: {}", e)))?;

        let encodings = config
            .encodings
            .iter()
            .filter_map(|label| {
                let encoding = Encoding::for_label(label.as_bytes());
                if encoding.is_none() {
                    warn!("Ignoring unknown encoding label: {}", label);
                }
                encoding
            })
            .collect();

        Ok(Self {
            client,
            max_retries: config.max_retries.max(1),
            retry_delay: config.retry_delay(),
            encodings,
        })
    }

    /// 执行单次 GET 并返回原始字节
    async fn get_once(&self, request: &PageRequest) -> Result<Vec<u8>, SourceError> {
        let mut builder = self.client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(SourceError::Network(format!("HTTP {}", resp.status())));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    /// # Summary
    /// 带重试机制的页面抓取。
    ///
    /// # Logic
    /// 1. 最多尝试 `max_retries` 次，每次失败后等待固定间隔（最后一次除外）。
    /// 2. 成功后按候选编码解码响应体。
    ///
    /// # Arguments
    /// * `request`: 抓取请求。
    ///
    /// # Returns
    /// 成功返回页面文本，重试耗尽返回最后一次的错误。
    async fn fetch(&self, request: &PageRequest) -> Result<String, SourceError> {
        let mut last_error = None;
        for attempt in 1..=self.max_retries {
            match self.get_once(request).await {
                Ok(body) => return Ok(decode_body(&body, &self.encodings)),
                Err(e) => {
                    warn!(
                        "  Attempt {}/{} failed for {}: {}",
                        attempt, self.max_retries, request.url, e
                    );
                    last_error = Some(e);
                    if attempt < self.max_retries {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }
        Err(last_error.unwrap_or_else(|| {
            SourceError::Network(format!("No attempt made for {}", request.url))
        }))
    }
}

/// # Summary
/// 按候选编码顺序严格解码，全部失败时退回有损 UTF-8。
///
/// # Logic
/// 1. 逐个尝试不带替换字符的严格解码，第一个成功的结果胜出。
/// 2. 全部失败时使用 `String::from_utf8_lossy`，保证永不失败。
pub fn decode_body(body: &[u8], encodings: &[&'static Encoding]) -> String {
    for encoding in encodings {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(body) {
            return text.into_owned();
        }
    }
    String::from_utf8_lossy(body).into_owned()
}
