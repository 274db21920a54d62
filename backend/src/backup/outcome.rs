//! 流程结果
//!
//! 编排器返回显式的结果对象，由适配层翻译为界面通知

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ErrorCategory;

/// 跳过原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// 自动上传未启用
    AutouploadDisabled,
    /// 未登录
    NotLoggedIn,
    /// 已有同步操作在进行
    Busy,
    /// 云端没有可恢复的备份
    NoRemoteBackup,
    /// 本地较新，按冲突策略跳过
    ConflictSkipped,
    /// 无需任何操作
    NothingToDo,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::AutouploadDisabled => write!(f, "autoupload disabled"),
            SkipReason::NotLoggedIn => write!(f, "not logged in"),
            SkipReason::Busy => write!(f, "another sync in progress"),
            SkipReason::NoRemoteBackup => write!(f, "no remote backup"),
            SkipReason::ConflictSkipped => write!(f, "local data newer, skipped"),
            SkipReason::NothingToDo => write!(f, "nothing to do"),
        }
    }
}

/// 同步流程结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// 已上传本地快照
    Uploaded {
        /// 快照对应的本地最后写入时间
        produced_at: DateTime<Utc>,
        /// 快照大小
        bytes: usize,
    },
    /// 已用云端备份替换本地数据
    Restored {
        /// 云端备份最后修改时间
        remote_last_modified: Option<DateTime<Utc>>,
        /// 备份大小
        bytes: usize,
    },
    /// 用户取消
    Cancelled,
    /// 跳过
    Skipped { reason: SkipReason },
    /// 失败（已转换为用户消息）
    Failed {
        category: ErrorCategory,
        message: String,
    },
}

impl SyncOutcome {
    /// 跳过
    pub fn skipped(reason: SkipReason) -> Self {
        SyncOutcome::Skipped { reason }
    }

    /// 是否发生了数据传输
    pub fn transferred(&self) -> bool {
        matches!(self, SyncOutcome::Uploaded { .. } | SyncOutcome::Restored { .. })
    }
}

/// 备份状态
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupStatus {
    /// 是否已登录
    pub logged_in: bool,
    /// 当前账号
    pub account: Option<String>,
    /// 云端是否有可恢复的备份
    pub backup_available: bool,
    /// 云端备份最后修改时间
    pub backup_last_modified: Option<DateTime<Utc>>,
}

impl BackupStatus {
    /// 未登录状态
    pub fn logged_out() -> Self {
        Self::default()
    }
}
