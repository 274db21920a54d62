//! 网络状态模块
//!
//! 平台网络探测由宿主实现，这里只定义状态和调度约束的判定

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// 当前网络状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NetworkState {
    /// 无网络
    Disconnected,
    /// 漫游网络
    Roaming,
    /// 按流量计费网络
    Metered,
    /// 不计费网络
    #[default]
    Unmetered,
}

impl NetworkState {
    /// 是否有网络连接
    pub fn is_connected(&self) -> bool {
        !matches!(self, NetworkState::Disconnected)
    }
}

impl std::fmt::Display for NetworkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkState::Disconnected => write!(f, "disconnected"),
            NetworkState::Roaming => write!(f, "roaming"),
            NetworkState::Metered => write!(f, "metered"),
            NetworkState::Unmetered => write!(f, "unmetered"),
        }
    }
}

/// 调度任务的网络要求
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NetworkRequirement {
    /// 无要求
    Any,
    /// 任意可用连接
    Connected,
    /// 有连接且不在漫游
    #[default]
    NotRoaming,
    /// 仅不计费网络
    Unmetered,
}

impl NetworkRequirement {
    /// 给定网络状态是否满足要求
    pub fn is_satisfied_by(&self, state: NetworkState) -> bool {
        match self {
            NetworkRequirement::Any => true,
            NetworkRequirement::Connected => state.is_connected(),
            NetworkRequirement::NotRoaming => {
                matches!(state, NetworkState::Metered | NetworkState::Unmetered)
            }
            NetworkRequirement::Unmetered => state == NetworkState::Unmetered,
        }
    }
}

/// 网络状态探测能力
pub trait NetworkMonitor: Send + Sync {
    /// 当前网络状态
    fn current_state(&self) -> NetworkState;
}

/// 固定网络状态（由配置或宿主推送）
#[derive(Debug, Default)]
pub struct StaticNetworkMonitor {
    state: RwLock<NetworkState>,
}

impl StaticNetworkMonitor {
    /// 使用给定状态创建
    pub fn new(state: NetworkState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// 更新网络状态
    pub fn set_state(&self, state: NetworkState) {
        *self.state.write() = state;
    }
}

impl NetworkMonitor for StaticNetworkMonitor {
    fn current_state(&self) -> NetworkState {
        *self.state.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_roaming_requirement() {
        let req = NetworkRequirement::NotRoaming;
        assert!(req.is_satisfied_by(NetworkState::Unmetered));
        assert!(req.is_satisfied_by(NetworkState::Metered));
        assert!(!req.is_satisfied_by(NetworkState::Roaming));
        assert!(!req.is_satisfied_by(NetworkState::Disconnected));
    }

    #[test]
    fn test_other_requirements() {
        assert!(NetworkRequirement::Any.is_satisfied_by(NetworkState::Disconnected));
        assert!(NetworkRequirement::Connected.is_satisfied_by(NetworkState::Roaming));
        assert!(!NetworkRequirement::Unmetered.is_satisfied_by(NetworkState::Metered));
    }

    #[test]
    fn test_static_monitor_updates() {
        let monitor = StaticNetworkMonitor::new(NetworkState::Unmetered);
        monitor.set_state(NetworkState::Roaming);
        assert_eq!(monitor.current_state(), NetworkState::Roaming);
    }
}
