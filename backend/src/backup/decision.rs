//! 同步决策
//!
//! 纯函数，无 IO、无副作用。输入为同一决策周期内取得的
//! (本地最后写入时间, 远端元数据) 以及用户的覆盖意愿。
//!
//! 规则按顺序判定：
//! 1. 远端没有备份 → Upload（首次备份）
//! 2. 用户明确拒绝 → NoOp
//! 3. 恢复意图，本地较新且用户未同意覆盖 → NeedsConfirmation
//! 4. 恢复意图，其余情况 → Download
//! 5. 备份意图 → Upload

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::remote::RemoteBackupMetadata;

/// 调用方意图
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncIntent {
    /// 备份：本地 → 云端
    Backup,
    /// 恢复：云端 → 本地
    Restore,
}

/// 决策结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// 上传本地快照
    Upload,
    /// 下载并替换本地数据
    Download,
    /// 需要用户再次确认
    NeedsConfirmation,
    /// 什么都不做
    NoOp,
}

/// 用户的覆盖意愿
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserConsent {
    /// 尚未询问
    NotAsked,
    /// 用户明确同意覆盖
    Confirmed,
    /// 用户明确拒绝
    Declined,
}

/// 无人值守同步遇到冲突（本地较新）时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// 以云端为准
    #[default]
    PreferRemote,
    /// 跳过本次同步并记录警告
    Skip,
}

impl ConflictPolicy {
    /// 无人值守流程对应的覆盖意愿
    pub fn unattended_consent(&self) -> UserConsent {
        match self {
            ConflictPolicy::PreferRemote => UserConsent::Confirmed,
            ConflictPolicy::Skip => UserConsent::NotAsked,
        }
    }
}

/// 决策
///
/// 时间戳缺失视为最早时间
pub fn decide(
    intent: SyncIntent,
    local_last_update: Option<DateTime<Utc>>,
    remote: &RemoteBackupMetadata,
    consent: UserConsent,
) -> SyncAction {
    if !remote.exists {
        return SyncAction::Upload;
    }

    if consent == UserConsent::Declined {
        return SyncAction::NoOp;
    }

    match intent {
        SyncIntent::Backup => SyncAction::Upload,
        SyncIntent::Restore => {
            let local = local_last_update.unwrap_or(DateTime::<Utc>::MIN_UTC);
            let remote_modified = remote.last_modified.unwrap_or(DateTime::<Utc>::MIN_UTC);

            if local > remote_modified && consent != UserConsent::Confirmed {
                SyncAction::NeedsConfirmation
            } else {
                SyncAction::Download
            }
        }
    }
}
