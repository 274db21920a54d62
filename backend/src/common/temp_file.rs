//! 临时文件守卫
//!
//! 整体替换文件时先写同目录临时文件，再原子重命名到目标路径。
//! 守卫在未提交时被丢弃会自动删除临时文件，保证失败路径不留半成品。

use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// 临时文件守卫
pub struct TempFileGuard {
    /// 临时文件路径
    path: PathBuf,
    /// 是否已提交（已重命名到目标路径）
    committed: bool,
}

impl TempFileGuard {
    /// 在目标文件同目录下创建临时文件守卫
    ///
    /// 同目录保证最终的 rename 不跨文件系统
    pub fn sibling_of(target: &Path) -> Self {
        let file_name = target
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "snapshot".to_string());
        let temp_name = format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple());

        Self {
            path: target.with_file_name(temp_name),
            committed: false,
        }
    }

    /// 获取临时文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 写入全部内容并落盘
    pub async fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        let mut file = tokio::fs::File::create(&self.path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        Ok(())
    }

    /// 原子重命名到目标路径
    pub async fn commit(mut self, target: &Path) -> io::Result<()> {
        tokio::fs::rename(&self.path, target).await?;
        self.committed = true;
        tracing::debug!("临时文件已提交: {} -> {}", self.path.display(), target.display());
        Ok(())
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("已清理临时文件: {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("清理临时文件失败: {} - {}", self.path.display(), e),
        }
    }
}

impl std::fmt::Debug for TempFileGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TempFileGuard")
            .field("path", &self.path)
            .field("committed", &self.committed)
            .finish()
    }
}
