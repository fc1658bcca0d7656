use fxrank_core::quote::port::BankAdapter;
use fxrank_core::test_utils::StaticFetcher;
use fxrank_feed::banks::{BankConfig, bank_table, build_adapters};
use fxrank_feed::validate::RateValidator;
use rust_decimal_macros::dec;
use std::sync::Arc;

const BOC_URL: &str = "https://www.boc.cn/sourcedb/whpj/";
const ICBC_API: &str = "https://papi.icbc.com.cn/exchanges/quotation?currencyCode=13";
const ICBC_HTML: &str = "https://icbc.com.cn/column/1438058341489590354.html";
const CCB_URL: &str = "https://forex.ccb.com/cn/forex/quotation/quotation.xml";
const CMB_API: &str = "https://fx.cmbchina.com/api/v1/fx/rate";
const BOCOM_URL: &str = "https://www.bankcomm.com/BankCommSite/zonghang/cn/whpj/rmbwhpj/index.html";
const ABC_API: &str = "https://ewealth.abchina.com/app/data/api/DataService/ExchangeRateV2";
const ABC_HTML: &str = "https://www.abchina.com/cn/ForeignExchange/";

const BOC_PAGE: &str = r#"<html><body><table>
  <tr><th>货币名称</th><th>现汇买入价</th><th>现钞买入价</th><th>现汇卖出价</th>
      <th>现钞卖出价</th><th>中行折算价</th><th>发布日期</th><th>发布时间</th></tr>
  <tr><td>美元</td><td>711.20</td><td>711.20</td><td>714.21</td><td>714.21</td>
      <td>710.72</td><td>2026.10.17</td><td>10:30:00</td></tr>
  <tr><td>英镑</td><td>952.10</td><td>922.50</td><td>954.44</td><td>958.20</td>
      <td>949.87</td><td>2026.10.17</td><td>10:30:00</td></tr>
</table></body></html>"#;

/// # Summary
/// 仅保留指定银行的配置，并以夹具抓取器构建其适配器。
fn adapter_for(code: &str, fetcher: StaticFetcher) -> (Arc<dyn BankAdapter>, Arc<StaticFetcher>) {
    let fetcher = Arc::new(fetcher);
    let configs: Vec<BankConfig> = bank_table()
        .into_iter()
        .filter(|b| b.profile.code == code)
        .collect();
    let mut adapters = build_adapters(configs, fetcher.clone(), RateValidator::default());
    let adapter = adapters.pop().expect("bank present in table");
    (adapter, fetcher)
}

#[tokio::test]
async fn test_boc_reads_selling_column_and_publish_time() {
    let (adapter, _) = adapter_for("BOC", StaticFetcher::new().with_page(BOC_URL, BOC_PAGE));

    let quote = adapter.quote().await.expect("BOC quote");
    assert_eq!(quote.bank_code, "BOC");
    assert_eq!(quote.bank_name, "中国银行");
    assert_eq!(quote.rate, dec!(9.5444));
    assert_eq!(quote.publish_time.as_deref(), Some("2026.10.17"));
    assert_eq!(quote.source_url, BOC_URL);
}

#[tokio::test]
async fn test_icbc_api_uses_display_url() {
    let (adapter, fetcher) = adapter_for(
        "ICBC",
        StaticFetcher::new().with_page(ICBC_API, r#"{"quotation":{"reference":"949.87","sellPrice":"955.10"}}"#),
    );

    let quote = adapter.quote().await.expect("ICBC quote");
    assert_eq!(quote.rate, dec!(9.551));
    assert_eq!(quote.source_url, "https://icbc.com.cn");
    assert_eq!(fetcher.hits(ICBC_HTML), 0);
}

#[tokio::test]
async fn test_icbc_falls_back_to_html_when_api_fails() {
    let html = r#"<table><tr><td>英镑</td><td>950.10</td><td>953.90</td></tr></table>"#;
    let (adapter, fetcher) = adapter_for(
        "ICBC",
        StaticFetcher::new()
            .with_failure(ICBC_API, "HTTP 503 Service Unavailable")
            .with_page(ICBC_HTML, html),
    );

    let quote = adapter.quote().await.expect("ICBC fallback quote");
    assert_eq!(quote.rate, dec!(9.539));
    assert_eq!(quote.source_url, ICBC_HTML);
    assert_eq!(fetcher.hits(ICBC_API), 1);
    assert_eq!(fetcher.hits(ICBC_HTML), 1);
}

#[tokio::test]
async fn test_out_of_range_primary_falls_through_to_fallback() {
    let html = r#"<table><tr><td>GBP</td><td>956.00</td></tr></table>"#;
    let (adapter, _) = adapter_for(
        "ABC",
        StaticFetcher::new()
            .with_page(ABC_API, r#"{"Data":[{"CurrencyName":"英镑","SellPrice":"95600"}]}"#)
            .with_page(ABC_HTML, html),
    );

    let quote = adapter.quote().await.expect("ABC fallback quote");
    assert_eq!(quote.rate, dec!(9.56));
    assert_eq!(quote.source_url, ABC_HTML);
}

#[tokio::test]
async fn test_ccb_xml_feed() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<ReferencePriceSettlements>
  <ReferencePriceSettlement><Currency>USD</Currency><BID>711.00</BID><SE_BID>714.00</SE_BID></ReferencePriceSettlement>
  <ReferencePriceSettlement><Currency>GBP</Currency><BID>951.00</BID><SE_BID>955.02</SE_BID></ReferencePriceSettlement>
</ReferencePriceSettlements>"#;
    let (adapter, _) = adapter_for("CCB", StaticFetcher::new().with_page(CCB_URL, xml));

    let quote = adapter.quote().await.expect("CCB quote");
    assert_eq!(quote.rate, dec!(9.5502));
    assert_eq!(quote.source_url, "https://forex.ccb.com");
}

#[tokio::test]
async fn test_cmb_api_accepts_direct_quotes() {
    let body = r#"{"data":[{"currency":"美元","sellPrice":"7.1420"},{"currency":"英镑 GBP","sellPrice":"9.5444"}]}"#;
    let (adapter, _) = adapter_for("CMB", StaticFetcher::new().with_page(CMB_API, body));

    let quote = adapter.quote().await.expect("CMB quote");
    assert_eq!(quote.rate, dec!(9.5444));
}

#[tokio::test]
async fn test_bocom_script_fallback() {
    let page = r#"<html><head><script>
        var rates = [["美元","710.10","713.90"],["英镑","950.50","954.80"]];
    </script></head><body><table><tr><td>加载中</td></tr></table></body></html>"#;
    let (adapter, _) = adapter_for("BOCOM", StaticFetcher::new().with_page(BOCOM_URL, page));

    let quote = adapter.quote().await.expect("BOCOM quote");
    assert_eq!(quote.rate, dec!(9.548));
}

#[tokio::test]
async fn test_exhausted_sources_yield_no_result() {
    let (adapter, fetcher) = adapter_for(
        "CMB",
        StaticFetcher::new()
            .with_page(CMB_API, "<html>maintenance</html>")
            .with_failure(
                "https://www.cmbchina.com/CmbWebPubInfo/RateResult.aspx?chnl=whjjckll",
                "timed out",
            ),
    );

    assert!(adapter.quote().await.is_none());
    assert_eq!(fetcher.hits(CMB_API), 1);
}
