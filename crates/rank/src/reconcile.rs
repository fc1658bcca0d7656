use fxrank_core::quote::entity::{PreviousSnapshot, RATE_SCALE, RateQuote};
use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::warn;

/// 百分比变化保留的小数位数
const PERCENT_SCALE: u32 = 2;

/// # Summary
/// 将本次报价与上一次快照对账，并按汇率排序。
///
/// # Logic
/// 1. 同一 `bank_code` 只保留第一条报价。
/// 2. 上一次快照中存在同一银行且汇率为正时，计算
///    `rate_change = new - old`（4 位小数）与
///    `rate_change_percent = change / old * 100`（2 位小数）；
///    计算溢出时不填写变化字段。
/// 3. 按汇率升序稳定排序，汇率相同时按 `bank_code` 排序。
///
/// # Arguments
/// * `quotes`: 本次运行收集到的报价（顺序任意）。
/// * `previous`: 上一次快照，没有时为 None。
///
/// # Returns
/// 带变化字段、已排序的报价列表，首个元素即最优银行。
pub fn reconcile(quotes: Vec<RateQuote>, previous: Option<&PreviousSnapshot>) -> Vec<RateQuote> {
    let previous_rates = previous.map(PreviousSnapshot::positive_rates).unwrap_or_default();

    let mut seen = HashSet::new();
    let mut banks: Vec<RateQuote> = quotes
        .into_iter()
        .filter(|quote| {
            let fresh = seen.insert(quote.bank_code.clone());
            if !fresh {
                warn!("Dropping duplicate quote for {}", quote.bank_code);
            }
            fresh
        })
        .map(|mut quote| {
            let (change, percent) = previous_rates
                .get(quote.bank_code.as_str())
                .and_then(|&old| rate_change(quote.rate, old))
                .map_or((None, None), |(change, percent)| (Some(change), Some(percent)));
            quote.rate_change = change;
            quote.rate_change_percent = percent;
            quote
        })
        .collect();

    banks.sort_by(|a, b| a.rate.cmp(&b.rate).then_with(|| a.bank_code.cmp(&b.bank_code)));
    banks
}

/// 计算绝对与百分比变化，`old` 必须为正；溢出时返回 None
fn rate_change(new: Decimal, old: Decimal) -> Option<(Decimal, Decimal)> {
    let change = new.checked_sub(old)?;
    let percent = change.checked_div(old)?.checked_mul(Decimal::ONE_HUNDRED)?;
    Some((change.round_dp(RATE_SCALE), percent.round_dp(PERCENT_SCALE)))
}

/// 变化方向箭头，仅用于日志摘要
pub fn change_arrow(change: Decimal) -> &'static str {
    if change > Decimal::ZERO {
        "↑"
    } else if change < Decimal::ZERO {
        "↓"
    } else {
        "→"
    }
}
