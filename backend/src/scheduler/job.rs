//! 周期同步任务定义

use serde::{Deserialize, Serialize};

use crate::backup::SyncOutcome;
use crate::network::NetworkRequirement;

/// 触发来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
    /// 定时触发
    Timer,
    /// 手动触发
    Manual,
}

impl std::fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerSource::Timer => write!(f, "timer"),
            TriggerSource::Manual => write!(f, "manual"),
        }
    }
}

/// 任务运行约束
///
/// 默认：不漫游即可运行，不要求设备空闲或充电，重启后恢复
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConstraints {
    /// 网络要求
    pub required_network: NetworkRequirement,
    /// 是否要求设备空闲
    pub requires_device_idle: bool,
    /// 是否要求充电
    pub requires_charging: bool,
    /// 是否在重启后恢复
    pub persisted: bool,
}

impl Default for JobConstraints {
    fn default() -> Self {
        Self {
            required_network: NetworkRequirement::NotRoaming,
            requires_device_idle: false,
            requires_charging: false,
            persisted: true,
        }
    }
}

/// 单次任务结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResult {
    /// 同步流程已执行（结果可能是跳过或预期内的失败）
    Completed(SyncOutcome),
    /// 不满足运行约束，推迟到下次触发
    Deferred,
    /// 意外错误
    Failed(String),
}

impl JobResult {
    /// 是否算作一次失败
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            JobResult::Failed(_) | JobResult::Completed(SyncOutcome::Failed { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::{ErrorCategory, SkipReason};

    #[test]
    fn test_default_constraints() {
        let constraints = JobConstraints::default();
        assert_eq!(constraints.required_network, NetworkRequirement::NotRoaming);
        assert!(!constraints.requires_device_idle);
        assert!(!constraints.requires_charging);
        assert!(constraints.persisted);
    }

    #[test]
    fn test_failure_classification() {
        assert!(JobResult::Failed("boom".to_string()).is_failure());
        assert!(JobResult::Completed(SyncOutcome::Failed {
            category: ErrorCategory::Transient,
            message: "timeout".to_string(),
        })
        .is_failure());
        assert!(!JobResult::Completed(SyncOutcome::skipped(SkipReason::NotLoggedIn)).is_failure());
        assert!(!JobResult::Deferred.is_failure());
    }
}
