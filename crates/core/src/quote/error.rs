use crate::store::error::StoreError;
use rust_decimal::Decimal;
use thiserror::Error;

/// # Summary
/// 单家银行数据源错误枚举，处理网络、解析、数值越界等问题。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - 只在单个适配器内部流转，永远不会越过适配器边界。
#[derive(Error, Debug)]
pub enum SourceError {
    // 网络层错误（重试耗尽后），包含底层 HTTP 客户端错误信息
    #[error("Network error: {0}")]
    Network(String),
    // 内容存在但格式不匹配，如 JSON 结构错误
    #[error("Parse error: {0}")]
    Parse(String),
    // 页面中未找到目标货币行或候选值
    #[error("Rate not found: {0}")]
    NotFound(String),
    // 找到数值但不在合理区间内
    #[error("Rate {rate} for {bank_code} is outside the valid range")]
    Validation { bank_code: String, rate: Decimal },
    // 未知或未分类的错误
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// # Summary
/// 整次运行的致命错误，决定进程退出码。
///
/// # Invariants
/// - 仅有“全部银行失败”与“写入失败”两类会终止运行。
#[derive(Error, Debug)]
pub enum RunError {
    // 没有任何一家银行返回报价
    #[error("Failed to fetch any bank rates")]
    AllBanksFailed,
    // 快照写入失败，磁盘上的旧快照保持不变
    #[error("Failed to persist snapshot: {0}")]
    Persist(#[from] StoreError),
}
