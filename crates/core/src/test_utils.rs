use crate::common::BankProfile;
use crate::quote::entity::RateQuote;
use crate::quote::error::SourceError;
use crate::quote::port::{BankAdapter, PageFetcher, PageRequest};
use async_trait::async_trait;
use dashmap::DashMap;

/// # Summary
/// 基于内存夹具的页面抓取器，按 URL 返回预置页面或预置失败。
///
/// # Invariants
/// - 未注册的 URL 一律返回 `SourceError::Network`。
/// - 记录每个 URL 的请求次数，供测试断言回退顺序。
#[derive(Default)]
pub struct StaticFetcher {
    pages: DashMap<String, Result<String, String>>,
    hits: DashMap<String, usize>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个返回指定内容的 URL
    pub fn with_page(self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), Ok(body.into()));
        self
    }

    /// 注册一个抓取失败的 URL
    pub fn with_failure(self, url: &str, reason: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), Err(reason.into()));
        self
    }

    /// 指定 URL 被请求的次数
    pub fn hits(&self, url: &str) -> usize {
        self.hits.get(url).map(|v| *v.value()).unwrap_or(0)
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, request: &PageRequest) -> Result<String, SourceError> {
        *self.hits.entry(request.url.clone()).or_insert(0) += 1;
        match self.pages.get(&request.url) {
            Some(entry) => entry.value().clone().map_err(SourceError::Network),
            None => Err(SourceError::Network(format!(
                "no fixture registered for {}",
                request.url
            ))),
        }
    }
}

/// # Summary
/// 返回固定结果的银行适配器，用于编排器与流水线测试。
pub struct FixedAdapter {
    profile: BankProfile,
    result: Option<RateQuote>,
}

impl FixedAdapter {
    pub fn new(profile: BankProfile, result: Option<RateQuote>) -> Self {
        Self { profile, result }
    }
}

#[async_trait]
impl BankAdapter for FixedAdapter {
    fn profile(&self) -> &BankProfile {
        &self.profile
    }

    async fn quote(&self) -> Option<RateQuote> {
        self.result.clone()
    }
}
