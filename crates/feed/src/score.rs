use crate::validate::RateValidator;
use fxrank_core::common::{QuoteConvention, parse_number};
use rust_decimal::Decimal;

/// # Summary
/// 候选值置信度。
///
/// # Invariants
/// - `Matched` 高于 `Heuristic`：与银行已知报价惯例一致的候选值优先。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Confidence {
    Heuristic,
    Matched,
}

/// # Summary
/// 从单元格中得出的一个汇率候选值。
#[derive(Debug, Clone, PartialEq)]
pub struct RateCandidate {
    // 来源单元格下标
    pub cell: usize,
    // 原始数值
    pub raw: Decimal,
    // 换算后的每单位汇率
    pub rate: Decimal,
    pub convention: QuoteConvention,
    pub confidence: Confidence,
}

/// # Summary
/// 为一行单元格生成全部通过合理区间的候选值，并按优先级排序。
///
/// # Logic
/// 1. 每个单元格同时尝试“每 100 单位”与“直接”两种报价惯例。
/// 2. 换算后不在合理区间内的候选值被丢弃。
/// 3. 与已知惯例一致的候选值标记为 `Matched`。
/// 4. 排序：置信度降序，其次汇率降序（卖出价总是不低于买入价），最后按单元格顺序。
///
/// # Arguments
/// * `cells`: 行内单元格文本。
/// * `validator`: 合理区间。
/// * `known`: 银行已知的报价惯例，未知时为 None。
///
/// # Returns
/// 排序后的候选值，首个即最佳候选。
pub fn score_candidates(
    cells: &[String],
    validator: &RateValidator,
    known: Option<QuoteConvention>,
) -> Vec<RateCandidate> {
    let mut candidates: Vec<RateCandidate> = cells
        .iter()
        .enumerate()
        .filter_map(|(cell, text)| parse_number(text).map(|raw| (cell, raw)))
        .flat_map(|(cell, raw)| {
            [QuoteConvention::Per100, QuoteConvention::Direct]
                .into_iter()
                .filter_map(move |convention| {
                    let rate = convention.convert(raw)?;
                    validator.accepts(rate).then_some(RateCandidate {
                        cell,
                        raw,
                        rate,
                        convention,
                        confidence: if Some(convention) == known {
                            Confidence::Matched
                        } else {
                            Confidence::Heuristic
                        },
                    })
                })
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.confidence
            .cmp(&a.confidence)
            .then(b.rate.cmp(&a.rate))
            .then(a.cell.cmp(&b.cell))
    });
    candidates
}

/// # Summary
/// 通用启发式：取最佳候选值的汇率。
///
/// 取区间内最大值只是尽力而为的列识别，异构页面上仍可能把买入价误判为卖出价。
pub fn pick_best(
    cells: &[String],
    validator: &RateValidator,
    known: Option<QuoteConvention>,
) -> Option<RateCandidate> {
    score_candidates(cells, validator, known).into_iter().next()
}

/// # Summary
/// 将单个原始数值解析为每单位汇率。
///
/// # Logic
/// 1. 优先按已知惯例换算。
/// 2. 换算结果不在区间内时，退回两种惯例的通用候选。
pub fn resolve_value(
    raw: Decimal,
    validator: &RateValidator,
    known: QuoteConvention,
) -> Option<Decimal> {
    if let Some(rate) = known.convert(raw)
        && validator.accepts(rate)
    {
        return Some(rate);
    }
    pick_best(&[raw.to_string()], validator, Some(known)).map(|c| c.rate)
}
