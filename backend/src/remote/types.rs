// 远端存储数据类型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 远端备份元数据
///
/// 只在一次决策周期内有效，每次同步都必须重新获取
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteBackupMetadata {
    /// 远端是否已有备份
    pub exists: bool,
    /// 远端备份最后修改时间
    pub last_modified: Option<DateTime<Utc>>,
}

impl RemoteBackupMetadata {
    /// 远端没有备份
    pub fn absent() -> Self {
        Self {
            exists: false,
            last_modified: None,
        }
    }

    /// 远端存在备份
    pub fn present(last_modified: DateTime<Utc>) -> Self {
        Self {
            exists: true,
            last_modified: Some(last_modified),
        }
    }
}

/// 登录方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    /// 交互式登录（可能弹出授权页面）
    Interactive,
    /// 静默登录（仅使用缓存凭证，不允许任何交互）
    Silent,
}

impl std::fmt::Display for LoginMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoginMode::Interactive => write!(f, "interactive"),
            LoginMode::Silent => write!(f, "silent"),
        }
    }
}

/// 提供方会话句柄
///
/// 令牌内容对核心流程不透明，只由 SessionManager 持有
#[derive(Clone)]
pub struct ProviderSession {
    /// 账号标识（用于日志）
    pub account: String,
    /// 不透明令牌
    token: String,
    /// 签发时间
    pub issued_at: DateTime<Utc>,
}

impl ProviderSession {
    /// 创建新的会话句柄
    pub fn new(account: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            token: token.into(),
            issued_at: Utc::now(),
        }
    }

    /// 令牌是否匹配
    pub fn token_matches(&self, token: &str) -> bool {
        self.token == token
    }
}

impl std::fmt::Debug for ProviderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSession")
            .field("account", &self.account)
            .field("token", &"***")
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_debug_hides_token() {
        let session = ProviderSession::new("user@example.com", "secret-token");
        let debug = format!("{:?}", session);
        assert!(!debug.contains("secret-token"));
        assert!(session.token_matches("secret-token"));
    }

    #[test]
    fn test_metadata_constructors() {
        assert!(!RemoteBackupMetadata::absent().exists);
        let now = Utc::now();
        let meta = RemoteBackupMetadata::present(now);
        assert!(meta.exists);
        assert_eq!(meta.last_modified, Some(now));
    }
}
