use crate::common::RateRange;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 全局应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub output: OutputConfig,
    pub fetch: FetchConfig,
    pub validation: ValidationConfig,
    pub orchestrator: OrchestratorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    // 快照输出路径
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    // 单次请求超时（秒）
    pub timeout_secs: u64,
    // 最大尝试次数
    pub max_retries: u32,
    // 两次尝试之间的固定等待（秒）
    pub retry_delay_secs: u64,
    // 依次尝试的候选编码标签
    pub encodings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub min_rate: f64,
    pub max_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    // 并发抓取上限
    pub max_workers: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("docs/data.json"),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_secs: 3,
            encodings: ["utf-8", "gb18030", "gbk", "big5"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_rate: 5.0,
            max_rate: 15.0,
        }
    }
}

impl ValidationConfig {
    /// 转换为十进制区间，配置非法时退回默认区间
    pub fn range(&self) -> RateRange {
        RateRange::from_bounds(self.min_rate, self.max_rate).unwrap_or_else(|| {
            tracing::warn!(
                "Invalid rate range [{}, {}], falling back to default",
                self.min_rate,
                self.max_rate
            );
            RateRange::default()
        })
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self { max_workers: 6 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.output.path, PathBuf::from("docs/data.json"));
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.fetch.max_retries, 3);
        assert_eq!(config.fetch.retry_delay_secs, 3);
        assert_eq!(config.fetch.encodings[0], "utf-8");
        assert_eq!(config.orchestrator.max_workers, 6);
        assert_eq!(config.validation.range().min, dec!(5));
        assert_eq!(config.validation.range().max, dec!(15));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"validation":{"min_rate":6.5},"output":{"path":"out/gbp.json"}}"#)
                .unwrap();
        assert_eq!(config.validation.range().min, dec!(6.5));
        assert_eq!(config.validation.range().max, dec!(15));
        assert_eq!(config.output.path, PathBuf::from("out/gbp.json"));
        assert_eq!(config.fetch.max_retries, 3);
    }

    #[test]
    fn test_inverted_range_falls_back() {
        let config = ValidationConfig {
            min_rate: 20.0,
            max_rate: 1.0,
        };
        assert_eq!(config.range(), RateRange::default());
    }
}
