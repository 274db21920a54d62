// 远端存储模块
//
// 云盘客户端对核心流程只是一个不透明的远端存储能力

pub mod constants;
pub mod folder;
pub mod types;

pub use constants::{classify_provider_code, ProviderCodeKind};
pub use folder::FolderStore;
pub use types::{LoginMode, ProviderSession, RemoteBackupMetadata};

use crate::database::BackupSnapshot;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// 远端存储错误
#[derive(Debug, Error)]
pub enum RemoteError {
    /// 用户取消认证
    #[error("认证已取消")]
    AuthenticationCancelled,

    /// 凭证或令牌被拒绝
    #[error("认证失败: {0}")]
    AuthenticationFailed(String),

    /// 尚未登录
    #[error("尚未登录远端存储")]
    NotAuthenticated,

    /// 远端对象不存在
    #[error("远端对象不存在: {0}")]
    NotFound(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    Network(String),

    /// 服务端错误
    #[error("服务错误: {code} - {message}")]
    Service { code: String, message: String },

    /// 数据校验失败
    #[error("数据校验失败: {0}")]
    Integrity(String),

    /// 本地 IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl RemoteError {
    /// 按提供方错误码构造错误
    pub fn from_provider_code(code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match classify_provider_code(code) {
            ProviderCodeKind::AuthenticationCancelled => RemoteError::AuthenticationCancelled,
            ProviderCodeKind::AuthenticationFailed => RemoteError::AuthenticationFailed(message),
            ProviderCodeKind::NotFound => RemoteError::NotFound(message),
            ProviderCodeKind::Service => RemoteError::Service {
                code: code.to_string(),
                message,
            },
        }
    }

    /// 按错误码表重新归类服务端错误
    ///
    /// 提供方把令牌失效、取消登录等情况包在普通服务错误里返回
    pub fn normalized(self) -> Self {
        match self {
            RemoteError::Service { code, message } => Self::from_provider_code(&code, message),
            other => other,
        }
    }

    /// 是否为认证类错误
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            RemoteError::AuthenticationFailed(_) | RemoteError::NotAuthenticated
        )
    }
}

/// 远端存储能力
///
/// 单一备份文件的 exists / upload / download / last-modified，外加登录登出
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// 远端是否存在备份
    async fn exists(&self) -> Result<bool, RemoteError>;

    /// 整体替换远端备份
    async fn upload(&self, snapshot: &BackupSnapshot) -> Result<(), RemoteError>;

    /// 下载远端备份
    async fn download(&self) -> Result<Vec<u8>, RemoteError>;

    /// 远端备份最后修改时间
    async fn last_modified(&self) -> Result<DateTime<Utc>, RemoteError>;

    /// 登录
    async fn login(&self, mode: LoginMode) -> Result<ProviderSession, RemoteError>;

    /// 登出（撤销远端令牌）
    async fn logout(&self) -> Result<(), RemoteError>;

    /// 当前是否持有有效会话
    fn is_authenticated(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_provider_code() {
        let err = RemoteError::from_provider_code("4f37.717b", "token expired");
        assert!(matches!(err, RemoteError::AuthenticationFailed(_)));
        assert!(err.is_auth_failure());

        let err = RemoteError::from_provider_code("authenticationCancelled", "");
        assert!(matches!(err, RemoteError::AuthenticationCancelled));

        let err = RemoteError::from_provider_code("serviceNotAvailable", "try later");
        assert_eq!(err.to_string(), "服务错误: serviceNotAvailable - try later");
        assert!(!err.is_auth_failure());
    }

    #[test]
    fn test_normalized_service_error() {
        let err = RemoteError::Service {
            code: "InvalidAuthenticationToken".to_string(),
            message: "expired".to_string(),
        }
        .normalized();
        assert!(matches!(err, RemoteError::AuthenticationFailed(ref m) if m == "expired"));

        let err = RemoteError::Service {
            code: "itemNotFound".to_string(),
            message: "gone".to_string(),
        }
        .normalized();
        assert!(matches!(err, RemoteError::NotFound(_)));

        let err = RemoteError::Service {
            code: "500".to_string(),
            message: "boom".to_string(),
        }
        .normalized();
        assert!(matches!(err, RemoteError::Service { .. }));
    }
}
