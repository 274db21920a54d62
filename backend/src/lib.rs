// Ledger Backup Library
// 账本数据库云端备份 / 恢复同步核心库

// 认证模块
pub mod auth;

// 备份同步模块
pub mod backup;

// 通用工具
pub mod common;

// 配置管理模块
pub mod config;

// 本地数据库模块
pub mod database;

// 用户对话模块
pub mod dialog;

// 网络状态模块
pub mod network;

// 远端存储模块
pub mod remote;

// 调度器模块
pub mod scheduler;

// 同步设置模块
pub mod settings;

#[cfg(test)]
mod testing;

// 导出常用类型
pub use auth::{AuthError, SessionManager, SessionOptions};
pub use backup::{
    decide, BackupOrchestrator, BackupStatus, ConflictPolicy, OrchestratorOptions, SyncAction,
    SyncError, SyncIntent, SyncOutcome, UserConsent,
};
pub use config::AppConfig;
pub use database::{BackupSnapshot, FileDatabase, LocalDatabase};
pub use dialog::{DialogService, HeadlessDialog, TerminalDialog};
pub use network::{NetworkMonitor, NetworkRequirement, NetworkState, StaticNetworkMonitor};
pub use remote::{FolderStore, RemoteBackupMetadata, RemoteError, RemoteStore};
pub use scheduler::{JobConstraints, JobResult, SyncScheduler, TriggerSource};
pub use settings::{JsonSettingsStore, MemorySettingsStore, SettingsStore, SyncSettings};
