use super::error::StoreError;
use crate::quote::entity::{ErrorDocument, PreviousSnapshot, Snapshot};
use async_trait::async_trait;

/// # Summary
/// 快照持久化接口。
///
/// # Invariants
/// - 写入失败时磁盘上已有的文档必须保持原样（不可出现截断或半写状态）。
/// - 实现必须是 `Send` 和 `Sync`。
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// # Summary
    /// 读取上一次运行的快照（仅读一次，随后会被覆盖）。
    ///
    /// # Returns
    /// 文件不存在返回 `Ok(None)`，无法解析返回 `StoreError::Deserialize`。
    async fn load_previous(&self) -> Result<Option<PreviousSnapshot>, StoreError>;

    /// # Summary
    /// 持久化成功快照。
    ///
    /// # Logic
    /// 1. 完整序列化文档。
    /// 2. 序列化成功后才替换目标文件。
    async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;

    /// # Summary
    /// 持久化失败状态文档。
    async fn save_error(&self, document: &ErrorDocument) -> Result<(), StoreError>;

    /// 输出文件是否已存在
    async fn exists(&self) -> bool;
}
