pub mod time;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 目标货币的中文名称
pub const CURRENCY_NAME: &str = "英镑";
/// 货币对标识
pub const CURRENCY_PAIR: &str = "GBP/CNY";
/// 报价类型标签（现汇卖出价）
pub const RATE_TYPE: &str = "现汇卖出价";
/// 行匹配使用的默认货币别名
pub const CURRENCY_ALIASES: &[&str] = &["英镑", "GBP"];

/// # Summary
/// 银行身份实体，描述一家银行的静态展示元数据。
///
/// # Invariants
/// - `code` 在一次运行中唯一，并在多次运行之间保持稳定（作为对账主键）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BankProfile {
    // 银行代码 (例如: BOC, ICBC)
    pub code: &'static str,
    // 银行全称
    pub name: &'static str,
    // 银行简称
    pub short_name: &'static str,
    // 前端展示颜色
    pub color: &'static str,
}

/// # Summary
/// 银行公布数值的报价惯例。
///
/// # Invariants
/// - `Per100` 的原始数值表示 100 单位外币对应的人民币金额。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum QuoteConvention {
    // 每 100 单位外币报价
    Per100,
    // 直接报价（每 1 单位外币）
    Direct,
}

impl QuoteConvention {
    /// # Summary
    /// 将原始数值按本惯例换算为每单位汇率。
    ///
    /// # Logic
    /// 1. `Per100` 要求原始值位于 [100, 2000]，换算为 raw / 100。
    /// 2. `Direct` 原样返回，由调用方做合理区间校验。
    ///
    /// # Arguments
    /// * `raw`: 页面上解析出的原始数值。
    ///
    /// # Returns
    /// 可换算时返回每单位汇率，否则返回 None。
    pub fn convert(self, raw: Decimal) -> Option<Decimal> {
        match self {
            QuoteConvention::Per100 => {
                if raw >= Decimal::ONE_HUNDRED && raw <= Decimal::from(2000) {
                    Some(raw / Decimal::ONE_HUNDRED)
                } else {
                    None
                }
            }
            QuoteConvention::Direct => Some(raw),
        }
    }
}

/// # Summary
/// 合理汇率闭区间（人民币 / 每单位外币）。
///
/// # Invariants
/// - `min <= max`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl RateRange {
    /// 由浮点配置构造区间，非法配置返回 None
    pub fn from_bounds(min: f64, max: f64) -> Option<Self> {
        let min = Decimal::from_f64(min)?;
        let max = Decimal::from_f64(max)?;
        (min <= max).then_some(Self { min, max })
    }

    /// 判断汇率是否落在闭区间内
    pub fn contains(&self, rate: Decimal) -> bool {
        self.min <= rate && rate <= self.max
    }
}

impl Default for RateRange {
    fn default() -> Self {
        Self {
            min: Decimal::from(5),
            max: Decimal::from(15),
        }
    }
}

/// # Summary
/// 解析页面单元格中的数值文本。
///
/// # Logic
/// 1. 去除首尾空白与千分位逗号。
/// 2. 按十进制解析，失败返回 None。
pub fn parse_number(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}
