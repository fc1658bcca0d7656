use crate::strategy::{ExtractContext, ExtractionStrategy};
use crate::validate::RateValidator;
use async_trait::async_trait;
use fxrank_core::common::{BankProfile, CURRENCY_ALIASES, QuoteConvention};
use fxrank_core::quote::entity::RateQuote;
use fxrank_core::quote::error::SourceError;
use fxrank_core::quote::port::{BankAdapter, PageFetcher, PageRequest};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// # Summary
/// 单个数据源配置：抓取地址、展示地址、附加请求头与提取策略链。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub url: String,
    // 写入 RateQuote.source_url 的地址，缺省为 `url`
    pub display_url: Option<String>,
    pub headers: Vec<(String, String)>,
    pub strategies: Vec<ExtractionStrategy>,
}

impl SourceSpec {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            display_url: None,
            headers: Vec::new(),
            strategies: Vec::new(),
        }
    }

    pub fn display_as(mut self, url: impl Into<String>) -> Self {
        self.display_url = Some(url.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn strategy(mut self, strategy: ExtractionStrategy) -> Self {
        self.strategies.push(strategy);
        self
    }

    fn request(&self) -> PageRequest {
        self.headers
            .iter()
            .fold(PageRequest::new(&self.url), |req, (name, value)| {
                req.with_header(name, value)
            })
    }

    fn source_url(&self) -> &str {
        self.display_url.as_deref().unwrap_or(&self.url)
    }
}

/// # Summary
/// 数据驱动的银行适配器：按顺序尝试主数据源与备用数据源。
///
/// # Invariants
/// - 内部任何失败都被记录并转换为“无结果”，不会越过适配器边界。
/// - 只有通过校验的汇率才会构造 RateQuote。
pub struct SourceChainAdapter {
    profile: BankProfile,
    // 银行公布数值使用的报价惯例
    convention: QuoteConvention,
    // 主数据源在前，备用数据源依序在后
    sources: Vec<SourceSpec>,
    fetcher: Arc<dyn PageFetcher>,
    validator: RateValidator,
}

impl SourceChainAdapter {
    pub fn new(
        profile: BankProfile,
        convention: QuoteConvention,
        sources: Vec<SourceSpec>,
        fetcher: Arc<dyn PageFetcher>,
        validator: RateValidator,
    ) -> Self {
        Self {
            profile,
            convention,
            sources,
            fetcher,
            validator,
        }
    }

    /// # Summary
    /// 在单个数据源上执行“抓取 -> 提取 -> 打分 -> 校验”流水线。
    ///
    /// # Logic
    /// 1. 抓取页面，失败直接返回网络错误。
    /// 2. 依次执行提取策略，第一个成功的策略胜出。
    /// 3. 所有策略失败时返回最后一个策略的错误。
    async fn try_source(&self, source: &SourceSpec) -> Result<RateQuote, SourceError> {
        let markup = self.fetcher.fetch(&source.request()).await?;

        let ctx = ExtractContext {
            bank_code: self.profile.code,
            aliases: CURRENCY_ALIASES,
            convention: self.convention,
            validator: &self.validator,
        };

        let mut last_error =
            SourceError::NotFound(format!("{}: no extraction strategy configured", self.profile.code));
        for strategy in &source.strategies {
            match strategy.extract(&markup, &ctx) {
                Ok(extraction) => {
                    debug!("{}: {} matched on {}", self.profile.code, strategy.name(), source.url);
                    return Ok(RateQuote::new(
                        &self.profile,
                        extraction.rate,
                        source.source_url(),
                        extraction.publish_time,
                    ));
                }
                Err(e) => {
                    debug!("{}: {} failed on {}: {}", self.profile.code, strategy.name(), source.url, e);
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }
}

#[async_trait]
impl BankAdapter for SourceChainAdapter {
    fn profile(&self) -> &BankProfile {
        &self.profile
    }

    /// # Summary
    /// 依次尝试所有数据源，返回第一条通过校验的报价。
    ///
    /// # Logic
    /// 1. 按配置顺序遍历数据源（主数据源优先）。
    /// 2. 任一阶段失败即记录警告并转入下一个数据源。
    /// 3. 全部耗尽返回 None。
    async fn quote(&self) -> Option<RateQuote> {
        info!("Fetching {}...", self.profile.code);
        for (index, source) in self.sources.iter().enumerate() {
            match self.try_source(source).await {
                Ok(quote) => return Some(quote),
                Err(e) => {
                    let kind = if index == 0 { "primary" } else { "fallback" };
                    warn!("  Error fetching {} ({} {}): {}", self.profile.code, kind, source.url, e);
                }
            }
        }
        warn!("  {}: all {} sources exhausted", self.profile.code, self.sources.len());
        None
    }
}
