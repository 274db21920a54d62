// 挂载为本地目录的云盘存储
//
// 同步客户端（OneDrive / 坚果云 等）把云盘挂载为本地目录时，
// 直接在目录里维护单一备份文件和一个元数据附属文件。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::constants::{DEFAULT_BACKUP_FILE_NAME, METADATA_SUFFIX};
use super::{LoginMode, ProviderSession, RemoteError, RemoteStore};
use crate::common::TempFileGuard;
use crate::database::BackupSnapshot;

/// 备份元数据附属文件内容
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SidecarMetadata {
    /// 备份对应的本地最后写入时间
    last_modified: DateTime<Utc>,
    /// 备份大小（字节）
    size: u64,
    /// 备份内容 MD5
    md5: String,
}

/// 目录云盘存储
pub struct FolderStore {
    /// 云盘挂载目录
    root: PathBuf,
    /// 备份文件名
    file_name: String,
    /// 当前会话令牌
    session_token: RwLock<Option<String>>,
}

impl FolderStore {
    /// 创建目录云盘存储
    ///
    /// # 参数
    /// * `root` - 云盘挂载目录
    /// * `file_name` - 备份文件名，默认为 "ledger.backup"
    pub fn new(root: impl Into<PathBuf>, file_name: Option<String>) -> Self {
        Self {
            root: root.into(),
            file_name: file_name.unwrap_or_else(|| DEFAULT_BACKUP_FILE_NAME.to_string()),
            session_token: RwLock::new(None),
        }
    }

    /// 备份文件路径
    pub fn backup_path(&self) -> PathBuf {
        self.root.join(&self.file_name)
    }

    fn metadata_path(&self) -> PathBuf {
        self.root
            .join(format!("{}{}", self.file_name, METADATA_SUFFIX))
    }

    fn require_session(&self) -> Result<(), RemoteError> {
        if self.session_token.read().is_none() {
            return Err(RemoteError::NotAuthenticated);
        }
        Ok(())
    }

    async fn read_metadata(&self) -> Result<Option<SidecarMetadata>, RemoteError> {
        match tokio::fs::read_to_string(self.metadata_path()).await {
            Ok(content) => {
                let meta = serde_json::from_str(&content).map_err(|e| {
                    RemoteError::Integrity(format!("备份元数据无法解析: {}", e))
                })?;
                Ok(Some(meta))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_atomically(target: &Path, bytes: &[u8]) -> Result<(), RemoteError> {
        let guard = TempFileGuard::sibling_of(target);
        guard.write_all(bytes).await?;
        guard.commit(target).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for FolderStore {
    async fn exists(&self) -> Result<bool, RemoteError> {
        self.require_session()?;
        Ok(tokio::fs::try_exists(self.backup_path()).await?)
    }

    async fn upload(&self, snapshot: &BackupSnapshot) -> Result<(), RemoteError> {
        self.require_session()?;

        let meta = SidecarMetadata {
            last_modified: snapshot.produced_at(),
            size: snapshot.len() as u64,
            md5: snapshot.md5_hex(),
        };
        let meta_json = serde_json::to_vec_pretty(&meta)
            .map_err(|e| RemoteError::Integrity(format!("备份元数据序列化失败: {}", e)))?;

        // 先写内容再写元数据：元数据不匹配时下载会校验失败，而不是读到半份备份
        Self::write_atomically(&self.backup_path(), snapshot.payload()).await?;
        Self::write_atomically(&self.metadata_path(), &meta_json).await?;

        info!(
            "备份已写入云盘目录: {} ({} bytes, md5={})",
            self.backup_path().display(),
            meta.size,
            meta.md5
        );
        Ok(())
    }

    async fn download(&self) -> Result<Vec<u8>, RemoteError> {
        self.require_session()?;

        let bytes = match tokio::fs::read(self.backup_path()).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RemoteError::NotFound(self.backup_path().display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        match self.read_metadata().await? {
            Some(meta) => {
                if meta.size != bytes.len() as u64 {
                    return Err(RemoteError::Integrity(format!(
                        "备份大小不匹配: 期望 {}, 实际 {}",
                        meta.size,
                        bytes.len()
                    )));
                }
                let actual = format!("{:x}", md5::compute(&bytes));
                if meta.md5 != actual {
                    return Err(RemoteError::Integrity(format!(
                        "备份 MD5 不匹配: 期望 {}, 实际 {}",
                        meta.md5, actual
                    )));
                }
            }
            None => warn!("备份缺少元数据文件，跳过完整性校验"),
        }

        debug!("已读取云盘备份: {} bytes", bytes.len());
        Ok(bytes)
    }

    async fn last_modified(&self) -> Result<DateTime<Utc>, RemoteError> {
        self.require_session()?;

        if let Some(meta) = self.read_metadata().await? {
            return Ok(meta.last_modified);
        }

        // 没有元数据时退回到文件系统时间
        match tokio::fs::metadata(self.backup_path()).await {
            Ok(fs_meta) => Ok(DateTime::<Utc>::from(fs_meta.modified()?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(RemoteError::NotFound(
                self.backup_path().display().to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn login(&self, mode: LoginMode) -> Result<ProviderSession, RemoteError> {
        let reachable = tokio::fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !reachable {
            return Err(RemoteError::Network(format!(
                "云盘目录不可访问: {}",
                self.root.display()
            )));
        }

        let token = Uuid::new_v4().to_string();
        *self.session_token.write() = Some(token.clone());
        info!("已连接云盘目录: {} (mode={})", self.root.display(), mode);

        Ok(ProviderSession::new(self.root.display().to_string(), token))
    }

    async fn logout(&self) -> Result<(), RemoteError> {
        *self.session_token.write() = None;
        info!("已断开云盘目录: {}", self.root.display());
        Ok(())
    }

    fn is_authenticated(&self) -> bool {
        self.session_token.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    async fn logged_in_store(dir: &TempDir) -> FolderStore {
        let store = FolderStore::new(dir.path(), None);
        store.login(LoginMode::Interactive).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_requires_login() {
        let dir = TempDir::new().unwrap();
        let store = FolderStore::new(dir.path(), None);

        assert!(!store.is_authenticated());
        assert!(matches!(store.exists().await, Err(RemoteError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_upload_then_download() {
        let dir = TempDir::new().unwrap();
        let store = logged_in_store(&dir).await;
        assert!(!store.exists().await.unwrap());

        let produced_at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let snapshot = BackupSnapshot::new(b"ledger-bytes".to_vec(), produced_at);
        store.upload(&snapshot).await.unwrap();

        assert!(store.exists().await.unwrap());
        assert_eq!(store.last_modified().await.unwrap(), produced_at);
        assert_eq!(store.download().await.unwrap(), b"ledger-bytes");
    }

    #[tokio::test]
    async fn test_download_detects_corruption() {
        let dir = TempDir::new().unwrap();
        let store = logged_in_store(&dir).await;

        let snapshot = BackupSnapshot::new(b"ledger-bytes".to_vec(), Utc::now());
        store.upload(&snapshot).await.unwrap();
        std::fs::write(store.backup_path(), b"ledger-bytez").unwrap();

        assert!(matches!(store.download().await, Err(RemoteError::Integrity(_))));
    }

    #[tokio::test]
    async fn test_download_missing_backup() {
        let dir = TempDir::new().unwrap();
        let store = logged_in_store(&dir).await;
        assert!(matches!(store.download().await, Err(RemoteError::NotFound(_))));
        assert!(matches!(store.last_modified().await, Err(RemoteError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_login_unreachable_folder() {
        let dir = TempDir::new().unwrap();
        let store = FolderStore::new(dir.path().join("not-mounted"), None);
        assert!(matches!(
            store.login(LoginMode::Silent).await,
            Err(RemoteError::Network(_))
        ));
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let dir = TempDir::new().unwrap();
        let store = logged_in_store(&dir).await;
        assert!(store.is_authenticated());

        store.logout().await.unwrap();
        assert!(!store.is_authenticated());
    }
}
