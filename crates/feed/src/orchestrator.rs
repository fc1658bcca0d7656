use fxrank_core::quote::entity::RateQuote;
use fxrank_core::quote::port::BankAdapter;
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, error, info, warn};

/// # Summary
/// 并发执行全部银行适配器并收集成功的报价。
///
/// # Logic
/// 1. 每个适配器一个 tokio 任务，并发数由信号量限制为 `min(适配器数, max_workers)`。
/// 2. 各任务通过 mpsc 通道回传 `(银行代码, 结果)`，按完成顺序收集。
/// 3. 任务 panic 只影响其自身银行，记录错误后继续等待其他任务。
///
/// # Arguments
/// * `adapters`: 银行适配器列表。
/// * `max_workers`: 并发上限（至少为 1）。
///
/// # Returns
/// 成功报价列表，顺序不确定，由对账步骤负责最终排序。
pub async fn fetch_all(adapters: &[Arc<dyn BankAdapter>], max_workers: usize) -> Vec<RateQuote> {
    if adapters.is_empty() {
        return Vec::new();
    }

    let pool_size = adapters.len().min(max_workers.max(1));
    let permits = Arc::new(Semaphore::new(pool_size));
    // 每个任务只发送一次，容量等于任务数时发送永不阻塞
    let (tx, mut rx) = mpsc::channel(adapters.len());
    debug!("Dispatching {} adapters on {} workers", adapters.len(), pool_size);

    let mut handles = Vec::with_capacity(adapters.len());
    for adapter in adapters {
        let adapter = adapter.clone();
        let permits = permits.clone();
        let tx = tx.clone();
        let code = adapter.profile().code;

        let handle = tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            let result = adapter.quote().await;
            if tx.send((adapter.profile().code, result)).await.is_err() {
                debug!("Result receiver dropped before {} finished", adapter.profile().code);
            }
        });
        handles.push((code, handle));
    }
    drop(tx);

    let mut quotes = Vec::with_capacity(adapters.len());
    while let Some((code, result)) = rx.recv().await {
        match result {
            Some(quote) => {
                info!("  ✓ {}: {} CNY/GBP", code, quote.rate);
                quotes.push(quote);
            }
            None => warn!("  ✗ {}: Failed to fetch", code),
        }
    }

    for (code, handle) in handles {
        if let Err(e) = handle.await {
            error!("  ✗ {}: Exception - {}", code, e);
        }
    }

    quotes
}
