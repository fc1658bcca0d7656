use fxrank_core::common::RateRange;
use fxrank_core::quote::error::SourceError;
use rust_decimal::Decimal;
use tracing::warn;

/// # Summary
/// 汇率合理区间校验器。
///
/// # Invariants
/// - 区间为闭区间，越界的候选值只记录警告，不作为错误中断流程。
#[derive(Debug, Clone, Copy, Default)]
pub struct RateValidator {
    range: RateRange,
}

impl RateValidator {
    pub fn new(range: RateRange) -> Self {
        Self { range }
    }

    /// 静默判断，不记录日志（用于候选值筛选）
    pub fn accepts(&self, rate: Decimal) -> bool {
        self.range.contains(rate)
    }

    /// # Summary
    /// 校验汇率是否在合理范围内。
    ///
    /// # Logic
    /// 1. 区间内返回 true。
    /// 2. 区间外记录警告并返回 false。
    ///
    /// # Arguments
    /// * `rate`: 每单位汇率。
    /// * `bank_code`: 银行代码，仅用于日志。
    pub fn validate(&self, rate: Decimal, bank_code: &str) -> bool {
        if self.range.contains(rate) {
            return true;
        }
        warn!(
            "  Warning: {} rate {} is outside valid range [{}, {}]",
            bank_code, rate, self.range.min, self.range.max
        );
        false
    }

    /// 校验并转换为 `SourceError::Validation`
    pub fn check(&self, rate: Decimal, bank_code: &str) -> Result<Decimal, SourceError> {
        if self.validate(rate, bank_code) {
            Ok(rate)
        } else {
            Err(SourceError::Validation {
                bank_code: bank_code.to_string(),
                rate,
            })
        }
    }
}
