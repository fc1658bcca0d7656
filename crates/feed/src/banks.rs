//! Static bank table: one data-driven adapter configuration per bank.

use crate::adapter::{SourceChainAdapter, SourceSpec};
use crate::strategy::ExtractionStrategy;
use crate::validate::RateValidator;
use fxrank_core::common::{BankProfile, QuoteConvention};
use fxrank_core::quote::port::{BankAdapter, PageFetcher};
use std::sync::Arc;

pub const BOC: BankProfile = BankProfile {
    code: "BOC",
    name: "中国银行",
    short_name: "中行",
    color: "#e60012",
};

pub const ICBC: BankProfile = BankProfile {
    code: "ICBC",
    name: "中国工商银行",
    short_name: "工行",
    color: "#c4161c",
};

pub const CCB: BankProfile = BankProfile {
    code: "CCB",
    name: "中国建设银行",
    short_name: "建行",
    color: "#004098",
};

pub const CMB: BankProfile = BankProfile {
    code: "CMB",
    name: "招商银行",
    short_name: "招行",
    color: "#c41230",
};

pub const BOCOM: BankProfile = BankProfile {
    code: "BOCOM",
    name: "交通银行",
    short_name: "交行",
    color: "#004a8f",
};

pub const ABC: BankProfile = BankProfile {
    code: "ABC",
    name: "中国农业银行",
    short_name: "农行",
    color: "#007f4e",
};

/// 通用 HTML 备用方案：提及货币的行内取最大候选值
const GENERIC_ROW: ExtractionStrategy = ExtractionStrategy::TableRowMax { min_cells: 1 };

/// # Summary
/// 单家银行的完整配置。
#[derive(Debug, Clone)]
pub struct BankConfig {
    pub profile: BankProfile,
    pub convention: QuoteConvention,
    pub sources: Vec<SourceSpec>,
}

/// # Summary
/// 内置银行配置表。
///
/// # Invariants
/// - `profile.code` 在表内唯一。
/// - 各银行均以“每 100 单位外币”报价。
pub fn bank_table() -> Vec<BankConfig> {
    vec![
        BankConfig {
            profile: BOC,
            convention: QuoteConvention::Per100,
            sources: vec![
                // 货币名称 | 现汇买入价 | 现钞买入价 | 现汇卖出价 | 现钞卖出价 | 中行折算价 | 发布时间
                SourceSpec::new("https://www.boc.cn/sourcedb/whpj/").strategy(
                    ExtractionStrategy::TableColumn {
                        min_cells: 7,
                        column: 3,
                        publish_time_column: Some(6),
                    },
                ),
            ],
        },
        BankConfig {
            profile: ICBC,
            convention: QuoteConvention::Per100,
            sources: vec![
                // currencyCode=13 即英镑
                SourceSpec::new("https://papi.icbc.com.cn/exchanges/quotation?currencyCode=13")
                    .display_as("https://icbc.com.cn")
                    .header("Accept", "application/json")
                    .header("Referer", "https://icbc.com.cn/")
                    .strategy(ExtractionStrategy::JsonRecords {
                        containers: &["quotation"],
                        currency_keys: &[],
                        price_keys: &["sellPrice", "sellprice"],
                    }),
                SourceSpec::new("https://icbc.com.cn/column/1438058341489590354.html")
                    .strategy(GENERIC_ROW),
            ],
        },
        BankConfig {
            profile: CCB,
            convention: QuoteConvention::Per100,
            sources: vec![
                SourceSpec::new("https://forex.ccb.com/cn/forex/quotation/quotation.xml")
                    .display_as("https://forex.ccb.com")
                    .strategy(ExtractionStrategy::XmlTagPair {
                        currency_tag: "Currency",
                        price_tag: "SE_BID",
                    })
                    .strategy(ExtractionStrategy::MarkupNumbers {
                        pattern: r">(\d{3}\.\d+)<",
                    }),
            ],
        },
        BankConfig {
            profile: CMB,
            convention: QuoteConvention::Per100,
            sources: vec![
                SourceSpec::new("https://fx.cmbchina.com/api/v1/fx/rate")
                    .display_as("https://www.cmbchina.com")
                    .header("Accept", "application/json")
                    .header("Referer", "https://www.cmbchina.com/")
                    .strategy(ExtractionStrategy::JsonRecords {
                        containers: &["data", "body"],
                        currency_keys: &["currency", "currencyCode"],
                        price_keys: &["sellPrice", "sell", "SE_BID"],
                    }),
                SourceSpec::new("https://www.cmbchina.com/CmbWebPubInfo/RateResult.aspx?chnl=whjjckll")
                    .strategy(GENERIC_ROW),
            ],
        },
        BankConfig {
            profile: BOCOM,
            convention: QuoteConvention::Per100,
            sources: vec![
                SourceSpec::new("https://www.bankcomm.com/BankCommSite/zonghang/cn/whpj/rmbwhpj/index.html")
                    .strategy(ExtractionStrategy::TableRowMax { min_cells: 4 })
                    .strategy(ExtractionStrategy::ScriptNumbers),
            ],
        },
        BankConfig {
            profile: ABC,
            convention: QuoteConvention::Per100,
            sources: vec![
                SourceSpec::new("https://ewealth.abchina.com/app/data/api/DataService/ExchangeRateV2")
                    .display_as("https://www.abchina.com")
                    .header("Accept", "application/json")
                    .header("Content-Type", "application/json")
                    .header("Referer", "https://www.abchina.com/")
                    .strategy(ExtractionStrategy::JsonRecords {
                        containers: &["Data", "data"],
                        currency_keys: &["CurrencyName", "Currency"],
                        price_keys: &["SellPrice", "SE_BID"],
                    }),
                SourceSpec::new("https://www.abchina.com/cn/ForeignExchange/").strategy(GENERIC_ROW),
            ],
        },
    ]
}

/// # Summary
/// 由配置表实例化全部银行适配器。
///
/// # Arguments
/// * `configs`: 银行配置（通常来自 `bank_table()`）。
/// * `fetcher`: 共享的页面抓取器。
/// * `validator`: 合理区间校验器。
///
/// # Returns
/// 每家银行一个适配器。
pub fn build_adapters(
    configs: Vec<BankConfig>,
    fetcher: Arc<dyn PageFetcher>,
    validator: RateValidator,
) -> Vec<Arc<dyn BankAdapter>> {
    configs
        .into_iter()
        .map(|config| {
            Arc::new(SourceChainAdapter::new(
                config.profile,
                config.convention,
                config.sources,
                fetcher.clone(),
                validator,
            )) as Arc<dyn BankAdapter>
        })
        .collect()
}
