//! 本地数据库模块
//!
//! 核心流程把本地数据库看作一个带版本的二进制快照生产者/消费者：
//! - 导出整份快照用于上传
//! - 用下载的快照整体替换本地数据库（全有或全无）

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::common::TempFileGuard;

/// 备份快照
///
/// 某一时刻本地数据库的完整序列化副本，创建后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSnapshot {
    /// 快照内容
    payload: Vec<u8>,
    /// 快照对应的本地最后写入时间
    produced_at: DateTime<Utc>,
}

impl BackupSnapshot {
    /// 创建快照
    pub fn new(payload: Vec<u8>, produced_at: DateTime<Utc>) -> Self {
        Self {
            payload,
            produced_at,
        }
    }

    /// 快照内容
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// 快照对应的本地最后写入时间
    pub fn produced_at(&self) -> DateTime<Utc> {
        self.produced_at
    }

    /// 快照大小（字节）
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// 快照是否为空
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// 快照内容的 MD5（小写十六进制）
    pub fn md5_hex(&self) -> String {
        format!("{:x}", md5::compute(&self.payload))
    }
}

/// 本地数据库能力
#[async_trait]
pub trait LocalDatabase: Send + Sync {
    /// 导出整份数据库内容
    async fn export(&self) -> Result<Vec<u8>>;

    /// 用给定内容整体替换本地数据库
    ///
    /// 实现必须保证部分写入不可见
    async fn replace(&self, payload: &[u8]) -> Result<()>;

    /// 数据库文件自身记录的最后修改时间（设置中没有记录时作为兜底）
    async fn last_modified(&self) -> Result<Option<DateTime<Utc>>>;
}

/// 基于单个文件的本地数据库
#[derive(Debug, Clone)]
pub struct FileDatabase {
    /// 数据库文件路径
    path: PathBuf,
}

impl FileDatabase {
    /// 创建文件数据库
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 数据库文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LocalDatabase for FileDatabase {
    async fn export(&self) -> Result<Vec<u8>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read database file: {}", self.path.display()))?;
        debug!("导出数据库: {} ({} bytes)", self.path.display(), bytes.len());
        Ok(bytes)
    }

    async fn replace(&self, payload: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create database directory")?;
        }

        let guard = TempFileGuard::sibling_of(&self.path);
        guard
            .write_all(payload)
            .await
            .context("Failed to write database temp file")?;
        guard
            .commit(&self.path)
            .await
            .context("Failed to swap database file")?;

        info!("本地数据库已替换: {} ({} bytes)", self.path.display(), payload.len());
        Ok(())
    }

    async fn last_modified(&self) -> Result<Option<DateTime<Utc>>> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) => {
                let modified = meta
                    .modified()
                    .context("Failed to read database modification time")?;
                Ok(Some(DateTime::<Utc>::from(modified)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("Failed to stat database file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_export_and_replace() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.db");
        std::fs::write(&path, b"accounts-v1").unwrap();

        let db = FileDatabase::new(&path);
        assert_eq!(db.export().await.unwrap(), b"accounts-v1");

        db.replace(b"accounts-v2").await.unwrap();
        assert_eq!(db.export().await.unwrap(), b"accounts-v2");

        // 目录里只剩数据库文件本身，没有残留临时文件
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_replace_creates_missing_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("ledger.db");

        let db = FileDatabase::new(&path);
        assert!(db.last_modified().await.unwrap().is_none());

        db.replace(b"fresh").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"fresh");
        assert!(db.last_modified().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_export_missing_database_fails() {
        let dir = TempDir::new().unwrap();
        let db = FileDatabase::new(dir.path().join("missing.db"));
        assert!(db.export().await.is_err());
    }

    #[test]
    fn test_snapshot_md5() {
        let snapshot = BackupSnapshot::new(b"test".to_vec(), Utc::now());
        assert_eq!(snapshot.md5_hex(), "098f6bcd4621d373cade4e832627b4f6");
        assert_eq!(snapshot.len(), 4);
        assert!(!snapshot.is_empty());
    }
}
