//! 同步设置持久化模块
//!
//! 设置由外部存储持有，核心只读取开关并在同步后写回执行时间戳。
//! 键名与移动端设置保持一致，方便多端共享同一份设置文件。

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::common::TempFileGuard;

/// 同步设置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SyncSettings {
    /// 是否启用自动上传（无人值守同步）
    pub is_backup_autoupload_enabled: bool,
    /// 是否已登录备份服务
    pub is_logged_in_to_backup_service: bool,
    /// 最后一次无人值守同步执行时间
    pub last_execution_time_stamp_sync_backup: Option<DateTime<Utc>>,
    /// 本地数据库最后写入时间
    pub last_database_update: Option<DateTime<Utc>>,
    /// 已登记的同步间隔（小时）
    pub sync_interval_hours: Option<u32>,
}

/// 设置存储能力
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// 读取设置
    async fn load(&self) -> Result<SyncSettings>;

    /// 保存设置
    async fn save(&self, settings: &SyncSettings) -> Result<()>;
}

/// 读取-修改-写回
///
/// 调用方负责持有同步锁，存储本身不做跨调用的互斥
pub async fn update_settings<F>(store: &dyn SettingsStore, mutate: F) -> Result<SyncSettings>
where
    F: FnOnce(&mut SyncSettings) + Send,
{
    let mut settings = store.load().await?;
    mutate(&mut settings);
    store.save(&settings).await?;
    Ok(settings)
}

/// JSON 文件设置存储
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    /// 设置文件路径
    path: PathBuf,
}

impl JsonSettingsStore {
    /// 创建 JSON 设置存储
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 设置文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsStore for JsonSettingsStore {
    async fn load(&self) -> Result<SyncSettings> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("设置文件不存在，使用默认设置: {}", self.path.display());
                return Ok(SyncSettings::default());
            }
            Err(e) => return Err(e).context("Failed to read settings file"),
        };

        if content.trim().is_empty() {
            warn!("设置文件为空，使用默认设置: {}", self.path.display());
            return Ok(SyncSettings::default());
        }

        serde_json::from_str(&content).context("Failed to parse settings file")
    }

    async fn save(&self, settings: &SyncSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create settings directory")?;
        }

        let json = serde_json::to_vec_pretty(settings).context("Failed to serialize settings")?;
        let guard = TempFileGuard::sibling_of(&self.path);
        guard
            .write_all(&json)
            .await
            .context("Failed to write settings temp file")?;
        guard
            .commit(&self.path)
            .await
            .context("Failed to replace settings file")?;

        debug!("设置已保存: {}", self.path.display());
        Ok(())
    }
}

/// 内存设置存储（嵌入宿主应用或测试时使用）
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: RwLock<SyncSettings>,
}

impl MemorySettingsStore {
    /// 使用初始设置创建
    pub fn new(settings: SyncSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }

    /// 当前设置的副本
    pub fn snapshot(&self) -> SyncSettings {
        self.settings.read().clone()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<SyncSettings> {
        Ok(self.snapshot())
    }

    async fn save(&self, settings: &SyncSettings) -> Result<()> {
        *self.settings.write() = settings.clone();
        Ok(())
    }
}
