//! Row extraction over bank markup.
//!
//! Table pages are tokenized with `scraper`; pages that keep their data in
//! inline scripts or XML fall back to regex scans over the raw text.

use fxrank_core::common::parse_number;
use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

/// 文本是否包含任一货币别名
pub fn mentions_currency(text: &str, aliases: &[&str]) -> bool {
    aliases.iter().any(|alias| text.contains(alias))
}

/// # Summary
/// 提取所有提及目标货币的表格行。
///
/// # Logic
/// 1. 解析 HTML 并遍历所有 `<tr>`。
/// 2. 跳过内部嵌套 `<table>` 的布局行。
/// 3. 每行只收集直接子节点 `<td>`/`<th>` 的文本（折叠空白）。
/// 4. 行内拼接文本包含任一别名时保留该行。
///
/// # Arguments
/// * `markup`: 页面原文。
/// * `aliases`: 货币别名（如 `英镑`、`GBP`）。
///
/// # Returns
/// 按文档顺序排列的单元格文本列表。
pub fn extract_rows(markup: &str, aliases: &[&str]) -> Vec<Vec<String>> {
    let document = Html::parse_document(markup);
    let (Ok(row_sel), Ok(table_sel)) = (Selector::parse("tr"), Selector::parse("table")) else {
        return Vec::new();
    };

    document
        .select(&row_sel)
        .filter(|row| row.select(&table_sel).next().is_none())
        .filter_map(|row| {
            let cells: Vec<String> = row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                .map(element_text)
                .collect();
            if cells.is_empty() || !mentions_currency(&cells.concat(), aliases) {
                return None;
            }
            Some(cells)
        })
        .collect()
}

/// # Summary
/// 提取提及目标货币的内联脚本内容。
pub fn script_blocks(markup: &str, aliases: &[&str]) -> Vec<String> {
    let document = Html::parse_document(markup);
    let Ok(script_sel) = Selector::parse("script") else {
        return Vec::new();
    };

    document
        .select(&script_sel)
        .map(|script| script.text().collect::<String>())
        .filter(|body| mentions_currency(body, aliases))
        .collect()
}

/// # Summary
/// 用正则在文本中提取数值。
///
/// # Logic
/// 1. 有捕获组时取第一个捕获组，否则取整体匹配。
/// 2. 无法解析为十进制的匹配被忽略。
pub fn regex_numbers(text: &str, pattern: &Regex) -> Vec<Decimal> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
        .filter_map(|m| parse_number(m.as_str()))
        .collect()
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const ALIASES: &[&str] = &["英镑", "GBP"];

    #[test]
    fn test_extract_rows_matches_any_alias() {
        let html = r#"
            <table>
              <tr><th>货币名称</th><th>现汇买入价</th></tr>
              <tr><td> 英镑 </td><td>952.10</td></tr>
              <tr><td>美元</td><td>711.20</td></tr>
              <tr><td>Pound GBP</td><td>951.00</td></tr>
            </table>"#;
        let rows = extract_rows(html, ALIASES);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["英镑".to_string(), "952.10".to_string()]);
        assert_eq!(rows[1][0], "Pound GBP");
    }

    #[test]
    fn test_extract_rows_ignores_layout_rows() {
        let html = r#"
            <table><tr><td>
              <table>
                <tr><th>货币</th><th>买入</th><th>卖出</th></tr>
                <tr><td>英镑</td><td>950.10</td><td>954.44</td></tr>
                <tr><td>科威特第纳尔</td><td>1320.00</td><td>1340.00</td></tr>
              </table>
            </td></tr></table>"#;
        let rows = extract_rows(html, ALIASES);
        assert_eq!(rows, vec![vec!["英镑".to_string(), "950.10".to_string(), "954.44".to_string()]]);
    }

    #[test]
    fn test_extract_rows_none_without_currency() {
        let html = "<table><tr><td>美元</td><td>711.20</td></tr></table>";
        assert!(extract_rows(html, ALIASES).is_empty());
    }

    #[test]
    fn test_script_blocks_filters_by_alias() {
        let html = r#"<html><head>
            <script>var usd = "711.20";</script>
            <script>var rates = [{"name":"英镑","sell":"956.20"}];</script>
            </head><body></body></html>"#;
        let blocks = script_blocks(html, ALIASES);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].contains("956.20"));
    }

    #[test]
    fn test_regex_numbers_prefers_capture_group() {
        let re = Regex::new(r">(\d{3}\.\d+)<").unwrap();
        let numbers = regex_numbers("<b>952.10</b><i>12.5</i><b>956.20</b>", &re);
        assert_eq!(numbers, vec![dec!(952.10), dec!(956.20)]);
    }
}
