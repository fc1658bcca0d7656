use crate::extract::{extract_rows, mentions_currency, regex_numbers, script_blocks};
use crate::score::{pick_best, resolve_value};
use crate::validate::RateValidator;
use fxrank_core::common::{QuoteConvention, parse_number};
use fxrank_core::quote::error::SourceError;
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use tracing::debug;

/// 脚本中疑似每 100 单位报价的数值
const SCRIPT_NUMBER_PATTERN: &str = r"(\d{3}\.\d+)";

/// # Summary
/// 单个数据源上按顺序尝试的提取策略。
///
/// # Invariants
/// - 每个策略独立可测，第一个产出通过校验的汇率的策略胜出。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// 首个单元格为货币名称的表格行，读取固定的卖出价列；
    /// 固定列不可用时退回该行的通用候选值。
    TableColumn {
        min_cells: usize,
        column: usize,
        publish_time_column: Option<usize>,
    },
    /// 提及货币的表格行内，取区间内的最大候选值。
    TableRowMax { min_cells: usize },
    /// JSON 接口：在容器键下查找记录（对象或数组），按货币键过滤，读取价格键。
    JsonRecords {
        containers: &'static [&'static str],
        currency_keys: &'static [&'static str],
        price_keys: &'static [&'static str],
    },
    /// XML 接口：货币标签之后第一个价格标签。
    XmlTagPair {
        currency_tag: &'static str,
        price_tag: &'static str,
    },
    /// 提及货币的内联脚本中的数值。
    ScriptNumbers,
    /// 页面提及货币时，对原文执行正则取数。
    MarkupNumbers { pattern: &'static str },
}

/// # Summary
/// 提取过程需要的银行上下文。
pub struct ExtractContext<'a> {
    pub bank_code: &'a str,
    pub aliases: &'a [&'a str],
    pub convention: QuoteConvention,
    pub validator: &'a RateValidator,
}

/// # Summary
/// 一次成功提取的结果。
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub rate: Decimal,
    pub publish_time: Option<String>,
}

impl Extraction {
    fn rate(rate: Decimal) -> Self {
        Self {
            rate,
            publish_time: None,
        }
    }
}

impl ExtractionStrategy {
    /// # Summary
    /// 在页面原文上执行本策略。
    ///
    /// # Arguments
    /// * `markup`: 抓取得到的页面文本（HTML、JSON 或 XML）。
    /// * `ctx`: 银行上下文。
    ///
    /// # Returns
    /// 成功返回通过校验的汇率，否则返回 `NotFound`/`Parse`/`Validation`。
    pub fn extract(&self, markup: &str, ctx: &ExtractContext<'_>) -> Result<Extraction, SourceError> {
        match self {
            ExtractionStrategy::TableColumn {
                min_cells,
                column,
                publish_time_column,
            } => table_column(markup, ctx, *min_cells, *column, *publish_time_column),
            ExtractionStrategy::TableRowMax { min_cells } => table_row_max(markup, ctx, *min_cells),
            ExtractionStrategy::JsonRecords {
                containers,
                currency_keys,
                price_keys,
            } => json_records(markup, ctx, containers, currency_keys, price_keys),
            ExtractionStrategy::XmlTagPair {
                currency_tag,
                price_tag,
            } => xml_tag_pair(markup, ctx, currency_tag, price_tag),
            ExtractionStrategy::ScriptNumbers => script_numbers(markup, ctx),
            ExtractionStrategy::MarkupNumbers { pattern } => markup_numbers(markup, ctx, pattern),
        }
    }

    /// 策略名称，仅用于日志
    pub fn name(&self) -> &'static str {
        match self {
            ExtractionStrategy::TableColumn { .. } => "table-column",
            ExtractionStrategy::TableRowMax { .. } => "table-row-max",
            ExtractionStrategy::JsonRecords { .. } => "json-records",
            ExtractionStrategy::XmlTagPair { .. } => "xml-tag-pair",
            ExtractionStrategy::ScriptNumbers => "script-numbers",
            ExtractionStrategy::MarkupNumbers { .. } => "markup-numbers",
        }
    }
}

fn not_found(ctx: &ExtractContext<'_>, what: &str) -> SourceError {
    SourceError::NotFound(format!("{}: {}", ctx.bank_code, what))
}

fn table_column(
    markup: &str,
    ctx: &ExtractContext<'_>,
    min_cells: usize,
    column: usize,
    publish_time_column: Option<usize>,
) -> Result<Extraction, SourceError> {
    let mut rejected = None;
    for cells in extract_rows(markup, ctx.aliases) {
        if cells.len() < min_cells || !mentions_currency(&cells[0], ctx.aliases) {
            continue;
        }
        let publish_time = publish_time_column.and_then(|i| cells.get(i).cloned());

        let fixed = cells
            .get(column)
            .and_then(|text| parse_number(text))
            .and_then(|raw| ctx.convention.convert(raw));
        match fixed {
            Some(rate) if ctx.validator.validate(rate, ctx.bank_code) => {
                return Ok(Extraction { rate, publish_time });
            }
            Some(rate) => rejected = Some(rate),
            None => debug!("{}: column {} unusable, trying row candidates", ctx.bank_code, column),
        }

        if let Some(candidate) = pick_best(&cells, ctx.validator, Some(ctx.convention)) {
            return Ok(Extraction {
                rate: candidate.rate,
                publish_time,
            });
        }
    }

    match rejected {
        Some(rate) => Err(SourceError::Validation {
            bank_code: ctx.bank_code.to_string(),
            rate,
        }),
        None => Err(not_found(ctx, "no currency row with a usable selling price")),
    }
}

fn table_row_max(markup: &str, ctx: &ExtractContext<'_>, min_cells: usize) -> Result<Extraction, SourceError> {
    extract_rows(markup, ctx.aliases)
        .into_iter()
        .filter(|cells| cells.len() >= min_cells)
        .find_map(|cells| pick_best(&cells, ctx.validator, Some(ctx.convention)))
        .map(|candidate| Extraction::rate(candidate.rate))
        .ok_or_else(|| not_found(ctx, "no currency row with an in-range value"))
}

fn json_records(
    markup: &str,
    ctx: &ExtractContext<'_>,
    containers: &[&str],
    currency_keys: &[&str],
    price_keys: &[&str],
) -> Result<Extraction, SourceError> {
    let root: Value =
        serde_json::from_str(markup.trim()).map_err(|e| SourceError::Parse(format!("{}: {}", ctx.bank_code, e)))?;

    let container = if containers.is_empty() {
        Some(&root)
    } else {
        containers.iter().find_map(|key| root.get(*key))
    };
    let records: Vec<&Value> = match container {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(record) if record.is_object() => vec![record],
        _ => return Err(SourceError::Parse(format!("{}: unexpected response shape", ctx.bank_code))),
    };

    let mut rejected = None;
    for record in records {
        if !currency_keys.is_empty() {
            let currency = currency_keys
                .iter()
                .find_map(|key| record.get(*key))
                .map(json_text)
                .unwrap_or_default();
            if !mentions_currency(&currency, ctx.aliases) {
                continue;
            }
        }

        let Some(raw) = price_keys
            .iter()
            .find_map(|key| record.get(*key))
            .and_then(json_number)
        else {
            continue;
        };

        match resolve_value(raw, ctx.validator, ctx.convention) {
            Some(rate) => return Ok(Extraction::rate(rate)),
            None => rejected = Some(raw),
        }
    }

    match rejected {
        Some(raw) => {
            ctx.validator.validate(raw, ctx.bank_code);
            Err(SourceError::Validation {
                bank_code: ctx.bank_code.to_string(),
                rate: raw,
            })
        }
        None => Err(not_found(ctx, "no currency record with a selling price")),
    }
}

fn xml_tag_pair(
    markup: &str,
    ctx: &ExtractContext<'_>,
    currency_tag: &str,
    price_tag: &str,
) -> Result<Extraction, SourceError> {
    let aliases = ctx
        .aliases
        .iter()
        .map(|alias| regex::escape(alias))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(
        r"(?s)<{c}>\s*(?:{aliases})\s*</{c}>.*?<{p}>\s*([\d.,]+)\s*</{p}>",
        c = regex::escape(currency_tag),
        p = regex::escape(price_tag),
    );
    let re = Regex::new(&pattern).map_err(|e| SourceError::Parse(e.to_string()))?;

    let raw = regex_numbers(markup, &re)
        .into_iter()
        .next()
        .ok_or_else(|| not_found(ctx, "currency tag not present"))?;

    resolve_value(raw, ctx.validator, ctx.convention)
        .map(Extraction::rate)
        .ok_or_else(|| {
            ctx.validator.validate(raw, ctx.bank_code);
            SourceError::Validation {
                bank_code: ctx.bank_code.to_string(),
                rate: raw,
            }
        })
}

fn script_numbers(markup: &str, ctx: &ExtractContext<'_>) -> Result<Extraction, SourceError> {
    let re = Regex::new(SCRIPT_NUMBER_PATTERN).map_err(|e| SourceError::Parse(e.to_string()))?;
    script_blocks(markup, ctx.aliases)
        .iter()
        .find_map(|body| best_of_numbers(&regex_numbers(body, &re), ctx))
        .map(Extraction::rate)
        .ok_or_else(|| not_found(ctx, "no in-range value in inline scripts"))
}

fn markup_numbers(markup: &str, ctx: &ExtractContext<'_>, pattern: &str) -> Result<Extraction, SourceError> {
    if !mentions_currency(markup, ctx.aliases) {
        return Err(not_found(ctx, "page does not mention the currency"));
    }
    let re = Regex::new(pattern).map_err(|e| SourceError::Parse(e.to_string()))?;
    best_of_numbers(&regex_numbers(markup, &re), ctx)
        .map(Extraction::rate)
        .ok_or_else(|| not_found(ctx, "no in-range value in markup"))
}

fn best_of_numbers(numbers: &[Decimal], ctx: &ExtractContext<'_>) -> Option<Decimal> {
    let cells: Vec<String> = numbers.iter().map(Decimal::to_string).collect();
    pick_best(&cells, ctx.validator, Some(ctx.convention)).map(|c| c.rate)
}

fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_number(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => parse_number(s),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}
