use crate::reconcile::{change_arrow, reconcile};
use fxrank_core::common::time::TimeProvider;
use fxrank_core::quote::entity::{ErrorDocument, Snapshot};
use fxrank_core::quote::error::RunError;
use fxrank_core::quote::port::BankAdapter;
use fxrank_core::store::port::SnapshotStore;
use fxrank_feed::orchestrator::fetch_all;
use std::sync::Arc;
use tracing::{error, info, warn};

/// # Summary
/// 执行一次完整的抓取、对账、持久化流程。
///
/// # Logic
/// 1. 读取上一次快照（读失败只记录警告，视为没有旧快照）。
/// 2. 并发抓取全部银行。
/// 3. 没有任何报价时返回 `RunError::AllBanksFailed`，不写入快照。
/// 4. 对账、排序并组装快照。
/// 5. 持久化快照，失败返回 `RunError::Persist`。
///
/// # Arguments
/// * `adapters`: 银行适配器。
/// * `store`: 快照存储。
/// * `clock`: 时间供给器。
/// * `max_workers`: 并发上限。
///
/// # Returns
/// 成功返回已持久化的快照。
pub async fn run_once(
    adapters: &[Arc<dyn BankAdapter>],
    store: &dyn SnapshotStore,
    clock: &dyn TimeProvider,
    max_workers: usize,
) -> Result<Snapshot, RunError> {
    let previous = match store.load_previous().await {
        Ok(previous) => previous,
        Err(e) => {
            warn!("Warning: Could not load previous data: {}", e);
            None
        }
    };

    info!("Fetching rates from {} banks...", adapters.len());
    let quotes = fetch_all(adapters, max_workers).await;
    if quotes.is_empty() {
        return Err(RunError::AllBanksFailed);
    }

    let banks = reconcile(quotes, previous.as_ref());
    let snapshot = Snapshot::assemble(banks, clock.now());
    store.save(&snapshot).await?;

    log_summary(&snapshot);
    Ok(snapshot)
}

/// # Summary
/// 处理整次运行失败。
///
/// # Logic
/// 1. 输出文件已存在时保持不变。
/// 2. 否则写入带错误信息的最小错误文档（写入失败只记录日志）。
pub async fn record_failure(store: &dyn SnapshotStore, err: &RunError, clock: &dyn TimeProvider) {
    error!("✗ Fatal error: {}", err);

    if store.exists().await {
        info!("Keeping previous data unchanged");
        return;
    }

    let document = ErrorDocument::new(err.to_string(), clock.now());
    if let Err(e) = store.save_error(&document).await {
        error!("Could not save error state: {}", e);
    }
}

fn log_summary(snapshot: &Snapshot) {
    info!("Summary: {} banks fetched", snapshot.bank_count);
    if let Some(best) = snapshot.banks.first() {
        info!("Best rate: {} - {} CNY/GBP", best.short_name, best.rate);
    }
    for bank in &snapshot.banks {
        match bank.rate_change {
            Some(change) => info!(
                "  {}: {} ({}{})",
                bank.short_name,
                bank.rate,
                change_arrow(change),
                change.abs().round_dp(4)
            ),
            None => info!("  {}: {}", bank.short_name, bank.rate),
        }
    }
}
