use async_trait::async_trait;
use fxrank_core::quote::entity::{ErrorDocument, PreviousSnapshot, Snapshot};
use fxrank_core::store::error::StoreError;
use fxrank_core::store::port::SnapshotStore;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// SnapshotStore 的 JSON 文件实现。
///
/// # Summary
/// 将快照以 2 空格缩进、非 ASCII 不转义的 UTF-8 JSON 写入单个文件。
///
/// # Invariants
/// * 先完整写入同目录下的临时文件，再原子替换目标文件。
/// * 任一步骤失败时目标文件保持原样。
/// * 替换后的文件保留原有权限。
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    /// 创建指向指定输出路径的存储实例（不触碰文件系统）。
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// # Summary
    /// 序列化并原子写入任意文档。
    ///
    /// # Logic
    /// 1. 在内存中完成整个文档的序列化。
    /// 2. 创建父目录。
    /// 3. 在目标目录创建临时文件（权限同目标文件），写入并落盘。
    /// 4. 通过 rename 原子替换目标文件。
    ///
    /// # Arguments
    /// * `document` - 待写入的文档。
    ///
    /// # Returns
    /// * `Result<(), StoreError>`
    async fn write_document<T: Serialize + Sync>(&self, document: &T) -> Result<(), StoreError> {
        let bytes =
            serde_json::to_vec_pretty(document).map_err(|e| StoreError::Serialize(e.to_string()))?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomic(&path, &bytes))
            .await
            .map_err(|e| StoreError::Io(e.to_string()))??;

        info!("✓ Saved data to {}", self.path.display());
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(|e| StoreError::Io(e.to_string()))?;

    let mut tmp = create_temp(&parent, path)?;
    tmp.write_all(bytes)
        .map_err(|e| StoreError::Io(e.to_string()))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| StoreError::Io(e.to_string()))?;
    tmp.persist(path)
        .map_err(|e| StoreError::Io(e.error.to_string()))?;
    Ok(())
}

/// # Summary
/// 在目标目录创建临时文件，权限与最终发布的文件一致。
///
/// # Logic
/// 1. Unix 下以 0644 创建（受 umask 约束），与普通创建文件一致。
/// 2. 目标文件已存在时沿用其权限。
fn create_temp(parent: &Path, target: &Path) -> Result<NamedTempFile, StoreError> {
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o644));
    }
    let tmp = builder
        .tempfile_in(parent)
        .map_err(|e| StoreError::Io(e.to_string()))?;

    if let Ok(metadata) = std::fs::metadata(target) {
        tmp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| StoreError::Io(e.to_string()))?;
    }
    Ok(tmp)
}

#[async_trait]
impl SnapshotStore for JsonSnapshotStore {
    /// # Summary
    /// 读取上一次的快照。
    ///
    /// # Logic
    /// 1. 文件不存在返回 None。
    /// 2. 以宽松模型解析，只保留对账所需字段。
    ///
    /// # Returns
    /// * `Result<Option<PreviousSnapshot>, StoreError>`
    async fn load_previous(&self) -> Result<Option<PreviousSnapshot>, StoreError> {
        if !self.exists().await {
            return Ok(None);
        }
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Deserialize(e.to_string()))
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.write_document(snapshot).await
    }

    async fn save_error(&self, document: &ErrorDocument) -> Result<(), StoreError> {
        self.write_document(document).await
    }

    async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }
}
