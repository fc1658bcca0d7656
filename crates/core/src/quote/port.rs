use crate::common::BankProfile;
use crate::quote::entity::RateQuote;
use crate::quote::error::SourceError;
use async_trait::async_trait;

/// # Summary
/// 一次页面抓取请求：目标 URL 与附加请求头。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub url: String,
    // 覆盖默认浏览器请求头的附加项
    pub headers: Vec<(String, String)>,
}

impl PageRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// # Summary
/// 页面抓取器接口（原始数据源传输层）。
///
/// # Invariants
/// - 仅执行 GET，必须幂等、可安全重试。
/// - 解码永不失败：所有候选编码失败时退回有损 UTF-8。
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// # Summary
    /// 抓取页面并解码为文本。
    ///
    /// # Logic
    /// 1. 合并默认请求头与请求附加头。
    /// 2. 在超时与重试策略下执行 GET。
    /// 3. 依次尝试候选编码解码响应体。
    ///
    /// # Arguments
    /// * `request`: 抓取请求。
    ///
    /// # Returns
    /// 成功返回页面文本，重试耗尽返回 `SourceError::Network`。
    async fn fetch(&self, request: &PageRequest) -> Result<String, SourceError>;
}

/// # Summary
/// 单家银行适配器契约：抓取、提取、打分、校验的组合。
///
/// # Invariants
/// - `quote` 永远不会把内部错误抛出适配器边界，失败一律记录日志并返回 None。
#[async_trait]
pub trait BankAdapter: Send + Sync {
    /// 适配器对应的银行身份
    fn profile(&self) -> &BankProfile;

    /// # Summary
    /// 依次尝试主数据源与备用数据源，返回第一条通过校验的报价。
    ///
    /// # Returns
    /// 成功返回报价，所有来源耗尽返回 None。
    async fn quote(&self) -> Option<RateQuote>;
}
