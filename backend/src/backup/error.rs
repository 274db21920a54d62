//! 同步错误处理模块
//!
//! 提供统一的错误分类和用户友好的错误消息。
//! 交互流程把预期内的错误转换为提示消息；无人值守流程只记录预期内的错误，
//! 意外错误则继续向调度器抛出。

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthError;
use crate::remote::RemoteError;

/// 同步错误
#[derive(Debug, Error)]
pub enum SyncError {
    /// 用户取消登录
    #[error("认证已取消")]
    AuthenticationCancelled,

    /// 凭证或令牌被拒绝
    #[error("认证失败: {0}")]
    AuthenticationFailed(String),

    /// 用户拒绝确认或中途取消
    #[error("操作已取消")]
    OperationCanceled,

    /// 尚未登录备份服务
    #[error("尚未登录备份服务")]
    NotLoggedIn,

    /// 已有同步操作正在进行
    #[error("已有同步操作正在进行")]
    Busy,

    /// 没有网络连接
    #[error("没有网络连接")]
    Offline,

    /// 远端服务或网络故障
    #[error("远端服务错误: {0}")]
    RemoteService(String),

    /// 远端调用超时
    #[error("远端调用超时: {operation} ({seconds} 秒)")]
    Timeout { operation: &'static str, seconds: u64 },

    /// 本地数据库错误
    #[error("本地数据库错误: {0}")]
    Database(String),

    /// 设置存储错误
    #[error("设置存储错误: {0}")]
    Settings(String),

    /// 意外错误
    #[error("意外错误: {0}")]
    Fatal(String),
}

impl SyncError {
    /// 获取错误分类
    pub fn category(&self) -> ErrorCategory {
        classify_error(self)
    }

    /// 获取用户友好的错误消息
    pub fn user_message(&self) -> String {
        to_user_message(self)
    }

    /// 是否为预期内的错误
    ///
    /// 预期内的错误在无人值守流程中被记录后吞掉，其余错误继续抛给调度器
    pub fn is_expected(&self) -> bool {
        !matches!(self.category(), ErrorCategory::Fatal)
    }

    /// 是否为用户取消
    pub fn is_cancellation(&self) -> bool {
        matches!(self.category(), ErrorCategory::UserCancelled)
    }
}

/// 错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// 用户取消
    UserCancelled,
    /// 认证错误（需要重新登录）
    Authentication,
    /// 临时错误（下次调度或手动操作即为重试）
    Transient,
    /// 资源被占用
    Busy,
    /// 意外错误
    Fatal,
}

/// 错误分类函数
pub fn classify_error(error: &SyncError) -> ErrorCategory {
    match error {
        SyncError::AuthenticationCancelled | SyncError::OperationCanceled => {
            ErrorCategory::UserCancelled
        }
        SyncError::AuthenticationFailed(_) | SyncError::NotLoggedIn => {
            ErrorCategory::Authentication
        }
        SyncError::Offline | SyncError::RemoteService(_) | SyncError::Timeout { .. } => {
            ErrorCategory::Transient
        }
        SyncError::Busy => ErrorCategory::Busy,
        SyncError::Database(_) | SyncError::Settings(_) | SyncError::Fatal(_) => {
            ErrorCategory::Fatal
        }
    }
}

/// 生成用户友好的错误消息
pub fn to_user_message(error: &SyncError) -> String {
    match error {
        SyncError::AuthenticationCancelled => "登录已取消".to_string(),
        SyncError::AuthenticationFailed(_) => "登录凭证已失效，请重新登录".to_string(),
        SyncError::OperationCanceled => "操作已取消".to_string(),
        SyncError::NotLoggedIn => "尚未登录备份服务，请先登录".to_string(),
        SyncError::Busy => "已有同步操作正在进行，请稍后再试".to_string(),
        SyncError::Offline => "当前没有网络连接，请检查网络后重试".to_string(),
        SyncError::RemoteService(msg) => format!("云端服务出错：{}", msg),
        SyncError::Timeout { .. } => "连接云端超时，请稍后重试".to_string(),
        SyncError::Database(msg) => format!("本地数据库操作失败：{}", msg),
        SyncError::Settings(msg) => format!("保存设置失败：{}", msg),
        SyncError::Fatal(msg) => format!("未知错误：{}", msg),
    }
}

/// 从 RemoteError 转换
impl From<RemoteError> for SyncError {
    fn from(err: RemoteError) -> Self {
        match err.normalized() {
            RemoteError::AuthenticationCancelled => SyncError::AuthenticationCancelled,
            RemoteError::AuthenticationFailed(msg) => SyncError::AuthenticationFailed(msg),
            err @ RemoteError::NotAuthenticated => SyncError::AuthenticationFailed(err.to_string()),
            other => SyncError::RemoteService(other.to_string()),
        }
    }
}

/// 从 AuthError 转换
impl From<AuthError> for SyncError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Cancelled => SyncError::AuthenticationCancelled,
            AuthError::Failed(msg) => SyncError::AuthenticationFailed(msg),
            AuthError::Unknown(msg) => SyncError::RemoteService(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert_eq!(SyncError::OperationCanceled.category(), ErrorCategory::UserCancelled);
        assert!(SyncError::OperationCanceled.is_cancellation());

        let remote = SyncError::RemoteService("503".to_string());
        assert_eq!(remote.category(), ErrorCategory::Transient);
        assert!(remote.is_expected());

        let db = SyncError::Database("disk full".to_string());
        assert_eq!(db.category(), ErrorCategory::Fatal);
        assert!(!db.is_expected());
    }

    #[test]
    fn test_from_remote_error() {
        let err: SyncError = RemoteError::from_provider_code("4f37.717b", "expired").into();
        assert!(matches!(err, SyncError::AuthenticationFailed(_)));

        let err: SyncError = RemoteError::Network("reset".to_string()).into();
        assert!(matches!(err, SyncError::RemoteService(_)));

        let err: SyncError = RemoteError::AuthenticationCancelled.into();
        assert!(err.is_cancellation());

        // 包在服务错误里的令牌失效码按认证失败处理
        let err: SyncError = RemoteError::Service {
            code: "4f37.717b".to_string(),
            message: "expired".to_string(),
        }
        .into();
        assert!(matches!(err, SyncError::AuthenticationFailed(ref m) if m == "expired"));
    }

    #[test]
    fn test_user_message() {
        let err = SyncError::Timeout {
            operation: "download",
            seconds: 30,
        };
        assert_eq!(err.user_message(), "连接云端超时，请稍后重试");
        assert_eq!(err.to_string(), "远端调用超时: download (30 秒)");
    }
}
