// 配置管理模块

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;

use crate::auth::SessionOptions;
use crate::backup::{ConflictPolicy, OrchestratorOptions};
use crate::network::NetworkState;
use crate::remote::constants::DEFAULT_BACKUP_FILE_NAME;

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 备份位置配置
    pub backup: BackupLocationConfig,
    /// 同步配置
    pub sync: SyncConfig,
    /// 网络配置
    pub network: NetworkConfig,
    /// 存储配置
    pub storage: StorageConfig,
}

/// 备份位置配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupLocationConfig {
    /// 本地数据库文件
    pub database_path: PathBuf,
    /// 云盘挂载目录
    pub remote_dir: PathBuf,
    /// 云端备份文件名
    pub backup_file_name: String,
}

impl Default for BackupLocationConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/ledger.db"),
            remote_dir: PathBuf::from("cloud"),
            backup_file_name: DEFAULT_BACKUP_FILE_NAME.to_string(),
        }
    }
}

/// 同步配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// 周期同步间隔（小时）
    pub interval_hours: u32,
    /// 远端调用超时（秒）
    pub remote_timeout_secs: u64,
    /// 登录超时（秒）
    pub login_timeout_secs: u64,
    /// 无人值守冲突策略
    pub conflict_policy: ConflictPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_hours: 24,
            remote_timeout_secs: 30,
            login_timeout_secs: 300,
            conflict_policy: ConflictPolicy::PreferRemote,
        }
    }
}

impl SyncConfig {
    /// 编排器配置
    pub fn orchestrator_options(&self) -> OrchestratorOptions {
        OrchestratorOptions {
            remote_timeout: Duration::from_secs(self.remote_timeout_secs),
            conflict_policy: self.conflict_policy,
        }
    }

    /// 会话超时配置
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            login_timeout: Duration::from_secs(self.login_timeout_secs),
            remote_timeout: Duration::from_secs(self.remote_timeout_secs),
        }
    }
}

/// 网络配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// 无法探测网络的主机上假定的网络状态
    pub state: NetworkState,
}

/// 存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 同步设置文件
    pub settings_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            settings_file: PathBuf::from("config/settings.json"),
        }
    }
}

impl AppConfig {
    /// 从文件加载配置
    pub async fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .context("Failed to read config file")?;

        let config: AppConfig = toml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        Ok(config)
    }

    /// 保存配置到文件
    pub async fn save_to_file(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        // 确保父目录存在
        if let Some(parent) = std::path::Path::new(path).parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        fs::write(path, content)
            .await
            .context("Failed to write config file")?;

        Ok(())
    }

    /// 加载或创建默认配置
    pub async fn load_or_default(path: &str) -> Self {
        match Self::load_from_file(path).await {
            Ok(config) => {
                tracing::info!("配置文件加载成功: {}", path);
                config
            }
            Err(e) => {
                tracing::warn!("配置文件加载失败，使用默认配置: {:#}", e);
                let default_config = Self::default();

                // 配置文件存在但内容有误时不覆盖，避免丢掉用户的修改
                if !std::path::Path::new(path).exists() {
                    if let Err(e) = default_config.save_to_file(path).await {
                        tracing::error!("保存默认配置失败: {}", e);
                    }
                }

                default_config
            }
        }
    }

    /// 验证配置
    pub fn validate(&self) -> Result<()> {
        if self.sync.interval_hours == 0 {
            bail!("sync.interval_hours 必须大于 0");
        }
        if self.sync.remote_timeout_secs == 0 {
            bail!("sync.remote_timeout_secs 必须大于 0");
        }
        if self.sync.login_timeout_secs == 0 {
            bail!("sync.login_timeout_secs 必须大于 0");
        }
        if self.backup.database_path.as_os_str().is_empty() {
            bail!("backup.database_path 不能为空");
        }
        if self.backup.remote_dir.as_os_str().is_empty() {
            bail!("backup.remote_dir 不能为空");
        }
        if self.backup.backup_file_name.trim().is_empty() {
            bail!("backup.backup_file_name 不能为空");
        }
        if self.storage.settings_file.as_os_str().is_empty() {
            bail!("storage.settings_file 不能为空");
        }
        Ok(())
    }
}
