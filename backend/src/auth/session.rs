// 会话管理
//
// 登录状态以设置中的 IsLoggedInToBackupService 为准，
// 提供方令牌只保存在内存里，由 SessionManager 独占。

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::remote::{LoginMode, ProviderSession, RemoteError, RemoteStore};
use crate::settings::{update_settings, SettingsStore};

/// 认证错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// 用户主动取消，不算错误
    #[error("登录已取消")]
    Cancelled,

    /// 凭证或令牌被拒绝，需要强制登出
    #[error("认证失败: {0}")]
    Failed(String),

    /// 网络或提供方故障，会话状态保持不变以便重试
    #[error("{0}")]
    Unknown(String),
}

impl From<RemoteError> for AuthError {
    fn from(err: RemoteError) -> Self {
        match err.normalized() {
            RemoteError::AuthenticationCancelled => AuthError::Cancelled,
            RemoteError::AuthenticationFailed(msg) => AuthError::Failed(msg),
            err @ RemoteError::NotAuthenticated => AuthError::Failed(err.to_string()),
            other => AuthError::Unknown(other.to_string()),
        }
    }
}

/// 会话超时配置
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// 登录超时（交互式登录需要等待用户操作）
    pub login_timeout: Duration,
    /// 登出等普通远端调用超时
    pub remote_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            login_timeout: Duration::from_secs(300),
            remote_timeout: Duration::from_secs(30),
        }
    }
}

/// 会话状态
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// 提供方会话句柄（不对外暴露令牌）
    handle: Option<ProviderSession>,
}

impl SessionState {
    /// 是否持有会话
    pub fn is_authenticated(&self) -> bool {
        self.handle.is_some()
    }

    /// 当前账号
    pub fn account(&self) -> Option<&str> {
        self.handle.as_ref().map(|h| h.account.as_str())
    }
}

/// 会话管理器
pub struct SessionManager {
    /// 远端存储（同时是身份提供方）
    remote: Arc<dyn RemoteStore>,
    /// 设置存储
    settings: Arc<dyn SettingsStore>,
    /// 当前会话（内存）
    state: RwLock<SessionState>,
    /// 超时配置
    options: SessionOptions,
}

impl SessionManager {
    /// 创建新的会话管理器
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        settings: Arc<dyn SettingsStore>,
        options: SessionOptions,
    ) -> Self {
        Self {
            remote,
            settings,
            state: RwLock::new(SessionState::default()),
            options,
        }
    }

    /// 登录
    ///
    /// 成功后持久化 logged-in = true
    pub async fn login(&self, mode: LoginMode) -> Result<(), AuthError> {
        info!("开始登录备份服务 (mode={})", mode);

        let session = match tokio::time::timeout(self.options.login_timeout, self.remote.login(mode)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("登录超时: {:?}", self.options.login_timeout);
                return Err(AuthError::Unknown(format!(
                    "登录超时（{} 秒）",
                    self.options.login_timeout.as_secs()
                )));
            }
        };

        let account = session.account.clone();
        self.state.write().handle = Some(session);

        update_settings(self.settings.as_ref(), |s| s.is_logged_in_to_backup_service = true)
            .await
            .map_err(|e| AuthError::Unknown(format!("保存登录状态失败: {}", e)))?;

        info!("登录成功: account={}", account);
        Ok(())
    }

    /// 登出
    ///
    /// 无论远端撤销是否成功，本地状态都会被清除并持久化 logged-in = false
    pub async fn logout(&self) -> Result<(), AuthError> {
        info!("登出备份服务");

        let revoke = match tokio::time::timeout(self.options.remote_timeout, self.remote.logout()).await {
            Ok(result) => result.map_err(AuthError::from),
            Err(_) => Err(AuthError::Unknown("登出超时".to_string())),
        };

        self.state.write().handle = None;

        if let Err(e) =
            update_settings(self.settings.as_ref(), |s| s.is_logged_in_to_backup_service = false).await
        {
            error!("保存登出状态失败: {}", e);
            return Err(AuthError::Unknown(format!("保存登出状态失败: {}", e)));
        }

        if let Err(ref e) = revoke {
            warn!("远端撤销令牌失败，本地状态已清除: {}", e);
        }
        revoke
    }

    /// 强制登出（认证失败时调用）
    pub async fn invalidate(&self, reason: &str) {
        warn!("会话失效，强制登出: {}", reason);
        if let Err(e) = self.logout().await {
            warn!("强制登出时出现错误: {}", e);
        }
    }

    /// 是否已登录（以持久化设置为准，不向远端校验）
    pub async fn is_logged_in(&self) -> bool {
        match self.settings.load().await {
            Ok(settings) => settings.is_logged_in_to_backup_service,
            Err(e) => {
                warn!("读取登录状态失败: {}", e);
                false
            }
        }
    }

    /// 内存中是否持有可用会话
    pub fn has_active_session(&self) -> bool {
        self.state.read().is_authenticated() && self.remote.is_authenticated()
    }

    /// 确保持有可用会话，没有时按给定方式登录
    pub async fn ensure_session(&self, mode: LoginMode) -> Result<(), AuthError> {
        if self.has_active_session() {
            return Ok(());
        }
        info!("内存中没有可用会话，尝试重新登录 (mode={})", mode);
        self.login(mode).await
    }

    /// 当前会话状态
    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }
}
