use crate::common::time::format_beijing;
use crate::common::{BankProfile, CURRENCY_NAME, CURRENCY_PAIR, RATE_TYPE};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 汇率保留的小数位数
pub const RATE_SCALE: u32 = 4;

/// # Summary
/// 结果文档的状态标记。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Error,
}

/// # Summary
/// 单家银行在一次运行中的报价结果。
///
/// # Invariants
/// - `rate` 必须位于合理区间内，越界候选值永远不会构造出 RateQuote。
/// - `rate_change` 与 `rate_change_percent` 仅在上一次快照中存在同一 `bank_code`
///   且其汇率为正时出现。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    // 银行代码，对账主键
    pub bank_code: String,
    // 银行全称
    pub bank_name: String,
    // 银行简称
    pub short_name: String,
    // 现汇卖出价（人民币 / 1 英镑），保留 4 位小数
    pub rate: Decimal,
    // 报价类型标签
    pub rate_type: String,
    // 数据源给出的发布时间（原始字符串，不解析）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_time: Option<String>,
    // 数值提取来源
    pub source_url: String,
    // 前端展示颜色
    pub color: String,
    pub status: RunStatus,
    // 相对上一次快照的绝对变化
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_change: Option<Decimal>,
    // 相对上一次快照的百分比变化
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_change_percent: Option<Decimal>,
}

impl RateQuote {
    /// # Summary
    /// 为指定银行构造一条成功的报价。
    ///
    /// # Logic
    /// 1. 从银行身份复制展示元数据。
    /// 2. 汇率四舍五入到 4 位小数。
    ///
    /// # Arguments
    /// * `profile`: 银行身份。
    /// * `rate`: 已校验的每单位汇率。
    /// * `source_url`: 数值来源 URL。
    /// * `publish_time`: 可选的原始发布时间。
    ///
    /// # Returns
    /// 不带变化字段的 RateQuote。
    pub fn new(
        profile: &BankProfile,
        rate: Decimal,
        source_url: impl Into<String>,
        publish_time: Option<String>,
    ) -> Self {
        Self {
            bank_code: profile.code.to_string(),
            bank_name: profile.name.to_string(),
            short_name: profile.short_name.to_string(),
            rate: rate.round_dp(RATE_SCALE),
            rate_type: RATE_TYPE.to_string(),
            publish_time: publish_time.filter(|t| !t.trim().is_empty()),
            source_url: source_url.into(),
            color: profile.color.to_string(),
            status: RunStatus::Success,
            rate_change: None,
            rate_change_percent: None,
        }
    }
}

/// # Summary
/// 一次运行的完整输出文档。
///
/// # Invariants
/// - `banks` 按 `rate` 升序排列，`best_*` 来自 `banks[0]`。
/// - 仅当 `bank_count >= 1` 时以 `success` 状态持久化。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub currency: String,
    pub pair: String,
    pub rate_type: String,
    // 最优（最低卖出价）银行代码
    pub best_bank: Option<String>,
    // 最优汇率
    pub best_rate: Option<Decimal>,
    pub banks: Vec<RateQuote>,
    pub bank_count: usize,
    pub fetched_at_utc: DateTime<Utc>,
    pub fetched_at_beijing: String,
    pub status: RunStatus,
}

impl Snapshot {
    /// # Summary
    /// 由已排序的报价列表组装快照。
    ///
    /// # Logic
    /// 1. 取第一条报价作为最优银行与最优汇率，列表为空时为 None。
    /// 2. 记录 UTC 与北京时间两种抓取时间戳。
    ///
    /// # Arguments
    /// * `banks`: 已按汇率升序排列的报价。
    /// * `now`: 本次运行时间。
    ///
    /// # Returns
    /// 状态为 `success` 的快照。
    pub fn assemble(banks: Vec<RateQuote>, now: DateTime<Utc>) -> Self {
        let best = banks.first();
        Self {
            currency: CURRENCY_NAME.to_string(),
            pair: CURRENCY_PAIR.to_string(),
            rate_type: RATE_TYPE.to_string(),
            best_bank: best.map(|b| b.bank_code.clone()),
            best_rate: best.map(|b| b.rate),
            bank_count: banks.len(),
            banks,
            fetched_at_utc: now,
            fetched_at_beijing: format_beijing(now),
            status: RunStatus::Success,
        }
    }

    /// 查找指定银行的报价
    pub fn quote(&self, bank_code: &str) -> Option<&RateQuote> {
        self.banks.iter().find(|b| b.bank_code == bank_code)
    }
}

/// # Summary
/// 整体失败且磁盘上没有旧快照时写入的最小错误文档。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDocument {
    pub status: RunStatus,
    pub error_message: String,
    pub fetched_at_utc: DateTime<Utc>,
    pub banks: Vec<RateQuote>,
}

impl ErrorDocument {
    pub fn new(error_message: impl Into<String>, now: DateTime<Utc>) -> Self {
        let mut error_message = error_message.into();
        if error_message.trim().is_empty() {
            error_message = "unknown error".to_string();
        }
        Self {
            status: RunStatus::Error,
            error_message,
            fetched_at_utc: now,
            banks: Vec::new(),
        }
    }
}

/// # Summary
/// 上一次快照中对账所需的最小字段。
///
/// # Invariants
/// - 宽松解析：错误文档或缺少字段的文档也能读取，此时 `banks` 为空。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PreviousSnapshot {
    #[serde(default)]
    pub banks: Vec<PreviousQuote>,
}

/// # Summary
/// 上一次快照中的单条银行记录。
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PreviousQuote {
    pub bank_code: String,
    #[serde(default)]
    pub rate: Option<Decimal>,
}

impl PreviousSnapshot {
    /// # Summary
    /// 构建 `bank_code -> rate` 索引，仅保留正汇率。
    pub fn positive_rates(&self) -> HashMap<&str, Decimal> {
        self.banks
            .iter()
            .filter_map(|b| match b.rate {
                Some(rate) if rate > Decimal::ZERO => Some((b.bank_code.as_str(), rate)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    const BOC: BankProfile = BankProfile {
        code: "BOC",
        name: "中国银行",
        short_name: "中行",
        color: "#e60012",
    };

    #[test]
    fn test_quote_rounds_to_four_places() {
        let quote = RateQuote::new(&BOC, dec!(9.544449), "https://www.boc.cn", None);
        assert_eq!(quote.rate, dec!(9.5444));
        assert_eq!(quote.rate_type, RATE_TYPE);
        assert!(quote.publish_time.is_none());
    }

    #[test]
    fn test_quote_json_omits_absent_changes() {
        let quote = RateQuote::new(&BOC, dec!(9.5444), "https://www.boc.cn", Some("10:30:00".into()));
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["rate"], serde_json::json!(9.5444));
        assert_eq!(json["status"], "success");
        assert_eq!(json["publish_time"], "10:30:00");
        assert!(json.get("rate_change").is_none());
        assert!(json.get("rate_change_percent").is_none());
    }

    #[test]
    fn test_empty_snapshot_has_null_best() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let snapshot = Snapshot::assemble(Vec::new(), now);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json["best_bank"].is_null());
        assert!(json["best_rate"].is_null());
        assert_eq!(json["bank_count"], 0);
        assert_eq!(json["fetched_at_beijing"], "2026-01-01 08:00:00");
    }

    #[test]
    fn test_previous_snapshot_reads_error_document() {
        let raw = r#"{"status":"error","error_message":"boom","fetched_at_utc":"2026-01-01T00:00:00Z","banks":[]}"#;
        let previous: PreviousSnapshot = serde_json::from_str(raw).unwrap();
        assert!(previous.banks.is_empty());
    }

    #[test]
    fn test_previous_snapshot_skips_non_positive_rates() {
        let raw = r#"{"banks":[{"bank_code":"BOC","rate":9.5},{"bank_code":"CCB","rate":0},{"bank_code":"ABC"}]}"#;
        let previous: PreviousSnapshot = serde_json::from_str(raw).unwrap();
        let rates = previous.positive_rates();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates.get("BOC"), Some(&dec!(9.5)));
    }

    #[test]
    fn test_error_document_never_has_empty_message() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let doc = ErrorDocument::new("  ", now);
        assert_eq!(doc.status, RunStatus::Error);
        assert!(!doc.error_message.is_empty());
        assert!(doc.banks.is_empty());
    }
}
