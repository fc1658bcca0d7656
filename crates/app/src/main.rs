use std::process::ExitCode;
use std::sync::Arc;

use fxrank_core::common::time::{RealTimeProvider, TimeProvider};
use fxrank_core::config::AppConfig;
use fxrank_feed::banks::{bank_table, build_adapters};
use fxrank_feed::http::HttpFetcher;
use fxrank_feed::validate::RateValidator;
use fxrank_rank::pipeline::{record_failure, run_once};
use fxrank_store::snapshot::JsonSnapshotStore;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// # Summary
/// 加载应用配置。
///
/// # Logic
/// 1. 以内置默认值为基础。
/// 2. 叠加可选的 `config/fxrank.{toml,json,yaml}` 文件。
/// 3. 叠加 `FXRANK__` 前缀的环境变量（如 `FXRANK__OUTPUT__PATH`）。
fn load_config() -> Result<AppConfig, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::with_name("config/fxrank").required(false))
        .add_source(
            config::Environment::with_prefix("FXRANK")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("fetch.encodings"),
        )
        .build()?
        .try_deserialize()
}

/// # Summary
/// 应用启动入口：单次运行、运行至完成。
/// 负责实例化具体实现组件并注入到运行流水线。
///
/// # Logic
/// 1. 初始化全局日志（非阻塞 stdout）。
/// 2. 加载配置。
/// 3. 实例化基础设施层（HttpFetcher、JsonSnapshotStore）。
/// 4. 由银行配置表构建全部适配器。
/// 5. 执行一次流水线；整体失败时按失败状态策略处理并以非零码退出。
#[tokio::main]
async fn main() -> ExitCode {
    // 1. 初始化日志，guard 必须存活到进程结束以刷新缓冲
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .init();

    let clock = RealTimeProvider;
    info!("Starting multi-bank GBP rate fetch at {}", clock.now().to_rfc3339());

    // 2. 加载配置
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // 3. 实例化基础设施层
    let fetcher = match HttpFetcher::new(&config.fetch) {
        Ok(fetcher) => Arc::new(fetcher),
        Err(e) => {
            error!("Failed to initialize fetcher: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let store = JsonSnapshotStore::new(&config.output.path);

    // 4. 构建银行适配器
    let validator = RateValidator::new(config.validation.range());
    let adapters = build_adapters(bank_table(), fetcher, validator);

    // 5. 执行流水线
    match run_once(&adapters, &store, &clock, config.orchestrator.max_workers).await {
        Ok(_) => {
            info!("✓ Task completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            record_failure(&store, &e, &clock).await;
            ExitCode::FAILURE
        }
    }
}
