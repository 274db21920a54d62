//! 备份编排器
//!
//! 组合会话、远端存储、本地数据库和决策函数，驱动四个入口：
//! - 手动备份
//! - 手动恢复
//! - 无人值守同步（由调度器触发）
//! - 认证前置检查
//!
//! 同一设备同时只允许一个同步类操作，由 `sync_lock` 保证。
//! 并发调用直接拒绝，不排队、不交错。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use super::decision::{decide, ConflictPolicy, SyncAction, SyncIntent, UserConsent};
use super::error::SyncError;
use super::messages::*;
use super::outcome::{BackupStatus, SkipReason, SyncOutcome};
use crate::auth::{AuthError, SessionManager};
use crate::database::{BackupSnapshot, LocalDatabase};
use crate::dialog::DialogService;
use crate::network::NetworkMonitor;
use crate::remote::{LoginMode, RemoteBackupMetadata, RemoteError, RemoteStore};
use crate::settings::{update_settings, SettingsStore, SyncSettings};

/// 认证方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// 交互流程：未登录时发起交互式登录
    Interactive,
    /// 无人值守流程：未登录时立即失败
    Unattended,
}

/// 编排器配置
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorOptions {
    /// 单次远端调用超时
    pub remote_timeout: Duration,
    /// 无人值守冲突策略
    pub conflict_policy: ConflictPolicy,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            remote_timeout: Duration::from_secs(30),
            conflict_policy: ConflictPolicy::PreferRemote,
        }
    }
}

/// 加载状态守卫
///
/// 未正常释放就被丢弃时，在后台补发一次 hide_loading
struct LoadingGuard {
    dialog: Option<Arc<dyn DialogService>>,
}

impl LoadingGuard {
    fn new(dialog: Arc<dyn DialogService>) -> Self {
        Self {
            dialog: Some(dialog),
        }
    }

    async fn release(mut self) {
        if let Some(dialog) = self.dialog.take() {
            dialog.hide_loading().await;
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let Some(dialog) = self.dialog.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("流程被中断，补发隐藏加载状态");
                handle.spawn(async move { dialog.hide_loading().await });
            }
            Err(_) => warn!("运行时已关闭，无法隐藏加载状态"),
        }
    }
}

/// 恢复计划（一次决策周期内的一致快照）
#[derive(Debug, Clone, Copy)]
struct RestorePlan {
    meta: RemoteBackupMetadata,
    local_last_update: Option<DateTime<Utc>>,
    action: SyncAction,
}

/// 备份编排器
pub struct BackupOrchestrator {
    /// 会话管理器
    session: Arc<SessionManager>,
    /// 远端存储
    remote: Arc<dyn RemoteStore>,
    /// 本地数据库
    database: Arc<dyn LocalDatabase>,
    /// 设置存储
    settings: Arc<dyn SettingsStore>,
    /// 用户对话
    dialog: Arc<dyn DialogService>,
    /// 网络状态
    network: Arc<dyn NetworkMonitor>,
    /// 配置
    options: OrchestratorOptions,
    /// 同步锁（保护 SessionState 和 SyncSettings 的读改写）
    sync_lock: Mutex<()>,
    /// 最近一次已知的云端备份时间
    backup_last_modified: RwLock<Option<DateTime<Utc>>>,
}

impl BackupOrchestrator {
    /// 创建新的备份编排器
    pub fn new(
        session: Arc<SessionManager>,
        remote: Arc<dyn RemoteStore>,
        database: Arc<dyn LocalDatabase>,
        settings: Arc<dyn SettingsStore>,
        dialog: Arc<dyn DialogService>,
        network: Arc<dyn NetworkMonitor>,
        options: OrchestratorOptions,
    ) -> Self {
        Self {
            session,
            remote,
            database,
            settings,
            dialog,
            network,
            options,
            sync_lock: Mutex::new(()),
            backup_last_modified: RwLock::new(None),
        }
    }

    /// 最近一次已知的云端备份时间
    pub fn backup_last_modified(&self) -> Option<DateTime<Utc>> {
        *self.backup_last_modified.read()
    }

    // ==================== 入口：手动备份 ====================

    /// 手动备份
    ///
    /// 确认 → 加载中 → 上传 → 隐藏加载 → 提示结果。
    /// 拒绝确认时直接返回，不进入加载状态。
    pub async fn run_manual_backup(&self) -> SyncOutcome {
        let _guard = match self.try_lock() {
            Ok(guard) => guard,
            Err(e) => return self.report_failure(e, BACKUP_FAILED_TITLE, UPLOAD_BACKUP_CANCELED_MESSAGE).await,
        };

        if !self.confirm(OVERWRITE_TITLE, OVERWRITE_BACKUP_MESSAGE).await {
            info!("用户取消备份");
            return SyncOutcome::Cancelled;
        }

        if let Err(e) = self.check_connectivity() {
            return self.report_failure(e, BACKUP_FAILED_TITLE, UPLOAD_BACKUP_CANCELED_MESSAGE).await;
        }

        match self.with_loading(self.backup_inner()).await {
            Ok(outcome) => {
                self.show_completion().await;
                outcome
            }
            Err(e) => self.report_failure(e, BACKUP_FAILED_TITLE, UPLOAD_BACKUP_CANCELED_MESSAGE).await,
        }
    }

    async fn backup_inner(&self) -> Result<SyncOutcome, SyncError> {
        self.ensure_authenticated(AuthMode::Interactive).await?;

        let settings = self.load_settings().await?;
        let meta = self.fetch_metadata().await?;
        let local = self.local_last_update(&settings).await?;

        let action = decide(SyncIntent::Backup, local, &meta, UserConsent::Confirmed);
        debug!("备份决策: {:?} (local={:?}, remote={:?})", action, local, meta);
        if action != SyncAction::Upload {
            return Err(SyncError::OperationCanceled);
        }

        let snapshot = self.capture_snapshot(local).await?;
        self.upload_snapshot(snapshot).await
    }

    // ==================== 入口：手动恢复 ====================

    /// 手动恢复
    ///
    /// 本地数据比云端新时会再次要求确认，只有明确同意才会覆盖。
    /// 每个远端阶段各自成对地显示/隐藏加载状态，第二次确认时不显示加载。
    pub async fn run_manual_restore(&self) -> SyncOutcome {
        let _guard = match self.try_lock() {
            Ok(guard) => guard,
            Err(e) => return self.report_failure(e, RESTORE_FAILED_TITLE, RESTORE_BACKUP_CANCELED_MESSAGE).await,
        };

        if !self.confirm(OVERWRITE_TITLE, OVERWRITE_DATA_MESSAGE).await {
            info!("用户取消恢复");
            return SyncOutcome::Cancelled;
        }

        if let Err(e) = self.check_connectivity() {
            return self.report_failure(e, RESTORE_FAILED_TITLE, RESTORE_BACKUP_CANCELED_MESSAGE).await;
        }

        // 阶段一：取元数据并决策
        let plan = match self.with_loading(self.plan_restore(UserConsent::NotAsked)).await {
            Ok(plan) => plan,
            Err(e) => return self.report_failure(e, RESTORE_FAILED_TITLE, RESTORE_BACKUP_CANCELED_MESSAGE).await,
        };

        let action = if plan.action == SyncAction::NeedsConfirmation {
            let consent = if self.confirm(FORCE_OVERRIDE_TITLE, FORCE_OVERRIDE_MESSAGE).await {
                UserConsent::Confirmed
            } else {
                UserConsent::Declined
            };
            decide(SyncIntent::Restore, plan.local_last_update, &plan.meta, consent)
        } else {
            plan.action
        };

        match action {
            SyncAction::Download => {
                // 阶段二：下载并替换
                match self.with_loading(self.download_and_apply(&plan.meta)).await {
                    Ok(outcome) => {
                        self.show_completion().await;
                        outcome
                    }
                    Err(e) => {
                        self.report_failure(e, RESTORE_FAILED_TITLE, RESTORE_BACKUP_CANCELED_MESSAGE)
                            .await
                    }
                }
            }
            SyncAction::Upload => {
                info!("云端没有备份，无法恢复");
                self.dialog.show_message(NO_BACKUP_TITLE, NO_BACKUP_MESSAGE).await;
                SyncOutcome::skipped(SkipReason::NoRemoteBackup)
            }
            SyncAction::NoOp | SyncAction::NeedsConfirmation => {
                info!("用户拒绝用较旧的云端备份覆盖本地数据");
                SyncOutcome::Cancelled
            }
        }
    }

    async fn plan_restore(&self, consent: UserConsent) -> Result<RestorePlan, SyncError> {
        self.ensure_authenticated(AuthMode::Interactive).await?;

        let settings = self.load_settings().await?;
        let meta = self.fetch_metadata().await?;
        let local_last_update = self.local_last_update(&settings).await?;
        let action = decide(SyncIntent::Restore, local_last_update, &meta, consent);
        debug!(
            "恢复决策: {:?} (local={:?}, remote={:?})",
            action, local_last_update, meta
        );

        Ok(RestorePlan {
            meta,
            local_last_update,
            action,
        })
    }

    // ==================== 入口：无人值守同步 ====================

    /// 无人值守同步
    ///
    /// - 自动上传未启用或未登录时立即返回，不发起网络调用，也不写时间戳
    /// - 通过门槛后，无论成功失败都会写入最后执行时间
    /// - 预期内的错误记录后转换为结果返回，意外错误继续抛出给调度器
    pub async fn run_unattended_sync(&self) -> Result<SyncOutcome, SyncError> {
        let _guard = match self.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                info!("已有同步操作在进行，本次无人值守同步跳过");
                return Ok(SyncOutcome::skipped(SkipReason::Busy));
            }
        };

        let settings = match self.load_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                error!(severity = "fatal", "无人值守同步读取设置失败: {}", e);
                return Err(e);
            }
        };

        if !settings.is_backup_autoupload_enabled {
            debug!("自动上传未启用，跳过无人值守同步");
            return Ok(SyncOutcome::skipped(SkipReason::AutouploadDisabled));
        }
        if !settings.is_logged_in_to_backup_service {
            debug!("未登录备份服务，跳过无人值守同步");
            return Ok(SyncOutcome::skipped(SkipReason::NotLoggedIn));
        }

        info!("开始无人值守同步");
        let result = self.unattended_restore(&settings).await;

        // 无论结果如何都写入最后执行时间
        let stamped = update_settings(self.settings.as_ref(), |s| {
            s.last_execution_time_stamp_sync_backup = Some(Utc::now());
        })
        .await
        .map_err(|e| SyncError::Settings(format!("{:#}", e)));

        let result = match (result, stamped) {
            (Ok(_), Err(stamp_err)) => Err(stamp_err),
            (result, Err(stamp_err)) => {
                error!("写入最后执行时间失败: {}", stamp_err);
                result
            }
            (result, Ok(_)) => result,
        };

        match result {
            Ok(outcome) => {
                info!("无人值守同步完成: {:?}", outcome);
                Ok(outcome)
            }
            Err(e) if e.is_expected() => {
                if matches!(e, SyncError::AuthenticationFailed(_)) {
                    self.session.invalidate(&e.to_string()).await;
                }
                if e.is_cancellation() {
                    info!("无人值守同步被取消: {}", e);
                } else {
                    warn!("无人值守同步失败（等待下次调度重试）: {}", e);
                }
                Ok(SyncOutcome::Failed {
                    category: e.category(),
                    message: e.to_string(),
                })
            }
            Err(e) => {
                error!(severity = "fatal", "无人值守同步出现意外错误: {}", e);
                Err(e)
            }
        }
    }

    async fn unattended_restore(&self, settings: &SyncSettings) -> Result<SyncOutcome, SyncError> {
        self.ensure_authenticated(AuthMode::Unattended).await?;

        let meta = self.fetch_metadata().await?;
        let local = self.local_last_update(settings).await?;
        let consent = self.options.conflict_policy.unattended_consent();
        let action = decide(SyncIntent::Restore, local, &meta, consent);
        debug!(
            "无人值守决策: {:?} (local={:?}, remote={:?}, policy={:?})",
            action, local, meta, self.options.conflict_policy
        );

        match action {
            SyncAction::Upload => {
                info!("云端还没有备份，上传本地快照");
                let snapshot = self.capture_snapshot(local).await?;
                self.upload_snapshot(snapshot).await
            }
            SyncAction::Download => self.download_and_apply(&meta).await,
            SyncAction::NeedsConfirmation => {
                warn!(
                    "本地数据 ({:?}) 比云端备份 ({:?}) 新，按策略跳过本次同步",
                    local, meta.last_modified
                );
                Ok(SyncOutcome::skipped(SkipReason::ConflictSkipped))
            }
            SyncAction::NoOp => Ok(SyncOutcome::skipped(SkipReason::NothingToDo)),
        }
    }

    // ==================== 入口：认证前置检查 ====================

    /// 确保已认证
    ///
    /// 未登录时，交互流程发起交互式登录，无人值守流程立即失败。
    /// 已登录但内存中没有会话（例如进程重启）时先尝试静默登录。
    pub async fn ensure_authenticated(&self, mode: AuthMode) -> Result<(), SyncError> {
        if !self.session.is_logged_in().await {
            return match mode {
                AuthMode::Unattended => Err(SyncError::NotLoggedIn),
                AuthMode::Interactive => Ok(self.session.login(LoginMode::Interactive).await?),
            };
        }

        match (self.session.ensure_session(LoginMode::Silent).await, mode) {
            (Ok(()), _) => Ok(()),
            (Err(AuthError::Cancelled), _) => Err(SyncError::AuthenticationCancelled),
            (Err(e), AuthMode::Unattended) => Err(e.into()),
            (Err(e), AuthMode::Interactive) => {
                info!("静默登录失败，改为交互式登录: {}", e);
                Ok(self.session.login(LoginMode::Interactive).await?)
            }
        }
    }

    // ==================== 登录 / 登出 / 状态 ====================

    /// 交互式登录，完成后刷新备份状态
    pub async fn login(&self) -> BackupStatus {
        let _guard = match self.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                self.dialog.show_message(BUSY_TITLE, BUSY_MESSAGE).await;
                return self.cached_status().await;
            }
        };

        if !self.network.current_state().is_connected() {
            self.dialog.show_message(NO_NETWORK_TITLE, NO_NETWORK_MESSAGE).await;
            return self.cached_status().await;
        }

        match self.session.login(LoginMode::Interactive).await {
            Ok(()) => {}
            Err(AuthError::Cancelled) => {
                self.dialog.show_message(CANCELED_TITLE, LOGIN_CANCELED_MESSAGE).await;
            }
            Err(AuthError::Failed(msg)) => {
                warn!("登录被拒绝: {}", msg);
                self.session.invalidate(&msg).await;
                self.dialog
                    .show_message(AUTHENTICATION_FAILED_TITLE, AUTHENTICATION_FAILED_MESSAGE)
                    .await;
            }
            Err(AuthError::Unknown(msg)) => {
                error!("登录失败: {}", msg);
                self.dialog
                    .show_message(LOGIN_FAILED_TITLE, &format!("登录失败：{}", msg))
                    .await;
            }
        }

        self.status_locked().await
    }

    /// 登出
    ///
    /// 本地登录状态总会被清除；远端撤销失败只提示用户
    pub async fn logout(&self) -> BackupStatus {
        let _guard = match self.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                self.dialog.show_message(BUSY_TITLE, BUSY_MESSAGE).await;
                return self.cached_status().await;
            }
        };

        match self.session.logout().await {
            Ok(()) => {}
            Err(AuthError::Cancelled) => {
                self.dialog.show_message(CANCELED_TITLE, LOGOUT_CANCELED_MESSAGE).await;
            }
            Err(e) => {
                error!("登出失败: {}", e);
                self.dialog.show_message(GENERAL_ERROR_TITLE, &e.to_string()).await;
            }
        }

        *self.backup_last_modified.write() = None;
        BackupStatus {
            logged_in: self.session.is_logged_in().await,
            ..BackupStatus::default()
        }
    }

    /// 刷新备份状态（云端是否有备份、最后修改时间）
    pub async fn refresh_backup_status(&self) -> BackupStatus {
        let _guard = match self.try_lock() {
            Ok(guard) => guard,
            Err(_) => return self.cached_status().await,
        };
        self.status_locked().await
    }

    async fn status_locked(&self) -> BackupStatus {
        if !self.session.is_logged_in().await {
            return BackupStatus::logged_out();
        }

        if !self.network.current_state().is_connected() {
            self.dialog.show_message(NO_NETWORK_TITLE, NO_NETWORK_MESSAGE).await;
            return self.cached_status().await;
        }

        let result = async {
            self.ensure_authenticated(AuthMode::Unattended).await?;
            self.fetch_metadata().await
        }
        .await;

        match result {
            Ok(meta) => {
                *self.backup_last_modified.write() = meta.last_modified;
                BackupStatus {
                    logged_in: true,
                    account: self.session.state().account().map(str::to_string),
                    backup_available: meta.exists,
                    backup_last_modified: meta.last_modified,
                }
            }
            Err(SyncError::AuthenticationFailed(msg)) => {
                self.session.invalidate(&msg).await;
                self.dialog
                    .show_message(AUTHENTICATION_FAILED_TITLE, AUTHENTICATION_FAILED_MESSAGE)
                    .await;
                BackupStatus::logged_out()
            }
            Err(e) => {
                warn!("获取备份状态失败: {}", e);
                self.cached_status().await
            }
        }
    }

    async fn cached_status(&self) -> BackupStatus {
        let last_modified = self.backup_last_modified();
        BackupStatus {
            logged_in: self.session.is_logged_in().await,
            account: self.session.state().account().map(str::to_string),
            backup_available: last_modified.is_some(),
            backup_last_modified: last_modified,
        }
    }

    // ==================== 共享步骤 ====================

    fn try_lock(&self) -> Result<MutexGuard<'_, ()>, SyncError> {
        self.sync_lock.try_lock().map_err(|_| {
            warn!("已有同步操作正在进行，拒绝本次调用");
            SyncError::Busy
        })
    }

    fn check_connectivity(&self) -> Result<(), SyncError> {
        let state = self.network.current_state();
        if !state.is_connected() {
            return Err(SyncError::Offline);
        }
        debug!("网络状态: {}", state);
        Ok(())
    }

    async fn confirm(&self, title: &str, body: &str) -> bool {
        self.dialog.show_confirm(title, body, YES_LABEL, NO_LABEL).await
    }

    async fn show_completion(&self) {
        self.dialog.show_message(SUCCESS_TITLE, TASK_SUCCESSFUL_MESSAGE).await;
    }

    /// 加载状态与一次远端阶段严格成对
    ///
    /// 流程中途被取消时由守卫补发隐藏
    async fn with_loading<T, F>(&self, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        self.dialog.show_loading().await;
        let guard = LoadingGuard::new(self.dialog.clone());
        let result = fut.await;
        guard.release().await;
        result
    }

    /// 在同步锁内修改设置
    ///
    /// 与同步流程互斥（等待而不是拒绝），避免读改写互相覆盖
    pub async fn update_settings_locked<F>(&self, mutate: F) -> Result<SyncSettings, SyncError>
    where
        F: FnOnce(&mut SyncSettings) + Send,
    {
        let _guard = self.sync_lock.lock().await;
        update_settings(self.settings.as_ref(), mutate)
            .await
            .map_err(|e| SyncError::Settings(format!("{:#}", e)))
    }

    /// 带超时的远端调用
    async fn remote_call<T, F>(&self, operation: &'static str, fut: F) -> Result<T, SyncError>
    where
        F: Future<Output = Result<T, RemoteError>>,
    {
        debug!("远端调用开始: {}", operation);
        match tokio::time::timeout(self.options.remote_timeout, fut).await {
            Ok(result) => {
                let result = result.map_err(RemoteError::normalized);
                match result {
                    Err(ref e) if e.is_auth_failure() => {
                        warn!("远端拒绝凭证: {} - {}", operation, e)
                    }
                    Err(ref e) => warn!("远端调用失败: {} - {}", operation, e),
                    Ok(_) => debug!("远端调用完成: {}", operation),
                }
                result.map_err(SyncError::from)
            }
            Err(_) => {
                warn!("远端调用超时: {}", operation);
                Err(SyncError::Timeout {
                    operation,
                    seconds: self.options.remote_timeout.as_secs(),
                })
            }
        }
    }

    async fn load_settings(&self) -> Result<SyncSettings, SyncError> {
        self.settings
            .load()
            .await
            .map_err(|e| SyncError::Settings(format!("{:#}", e)))
    }

    /// 每次决策都重新获取远端元数据
    async fn fetch_metadata(&self) -> Result<RemoteBackupMetadata, SyncError> {
        if !self.remote_call("exists", self.remote.exists()).await? {
            return Ok(RemoteBackupMetadata::absent());
        }
        let last_modified = self
            .remote_call("last_modified", self.remote.last_modified())
            .await?;
        Ok(RemoteBackupMetadata::present(last_modified))
    }

    /// 本地最后写入时间：设置优先，数据库文件时间兜底
    async fn local_last_update(
        &self,
        settings: &SyncSettings,
    ) -> Result<Option<DateTime<Utc>>, SyncError> {
        if settings.last_database_update.is_some() {
            return Ok(settings.last_database_update);
        }
        self.database
            .last_modified()
            .await
            .map_err(|e| SyncError::Database(format!("{:#}", e)))
    }

    async fn capture_snapshot(
        &self,
        local_last_update: Option<DateTime<Utc>>,
    ) -> Result<BackupSnapshot, SyncError> {
        let payload = self
            .database
            .export()
            .await
            .map_err(|e| SyncError::Database(format!("{:#}", e)))?;
        let produced_at = local_last_update.unwrap_or_else(Utc::now);
        Ok(BackupSnapshot::new(payload, produced_at))
    }

    async fn upload_snapshot(&self, snapshot: BackupSnapshot) -> Result<SyncOutcome, SyncError> {
        info!(
            "上传备份快照: {} bytes, produced_at={}",
            snapshot.len(),
            snapshot.produced_at()
        );
        self.remote_call("upload", self.remote.upload(&snapshot)).await?;

        *self.backup_last_modified.write() = Some(snapshot.produced_at());
        Ok(SyncOutcome::Uploaded {
            produced_at: snapshot.produced_at(),
            bytes: snapshot.len(),
        })
    }

    async fn download_and_apply(
        &self,
        meta: &RemoteBackupMetadata,
    ) -> Result<SyncOutcome, SyncError> {
        let payload = self.remote_call("download", self.remote.download()).await?;

        self.database
            .replace(&payload)
            .await
            .map_err(|e| SyncError::Database(format!("{:#}", e)))?;

        // 本地数据现在与云端备份一致
        if let Some(remote_modified) = meta.last_modified {
            update_settings(self.settings.as_ref(), |s| {
                s.last_database_update = Some(remote_modified);
            })
            .await
            .map_err(|e| SyncError::Settings(format!("{:#}", e)))?;
        }

        *self.backup_last_modified.write() = meta.last_modified;
        info!("已从云端恢复 {} bytes", payload.len());

        Ok(SyncOutcome::Restored {
            remote_last_modified: meta.last_modified,
            bytes: payload.len(),
        })
    }

    /// 交互流程的错误统一转换为提示
    async fn report_failure(
        &self,
        err: SyncError,
        failed_title: &str,
        canceled_message: &str,
    ) -> SyncOutcome {
        match err {
            SyncError::OperationCanceled => SyncOutcome::Cancelled,
            SyncError::AuthenticationCancelled => {
                self.dialog.show_message(CANCELED_TITLE, canceled_message).await;
                SyncOutcome::Cancelled
            }
            SyncError::AuthenticationFailed(ref msg) => {
                self.session.invalidate(msg).await;
                self.dialog
                    .show_message(AUTHENTICATION_FAILED_TITLE, AUTHENTICATION_FAILED_MESSAGE)
                    .await;
                Self::failed(&err)
            }
            SyncError::Busy => {
                self.dialog.show_message(BUSY_TITLE, BUSY_MESSAGE).await;
                SyncOutcome::skipped(SkipReason::Busy)
            }
            SyncError::Offline => {
                self.dialog.show_message(NO_NETWORK_TITLE, NO_NETWORK_MESSAGE).await;
                Self::failed(&err)
            }
            _ => {
                error!("{}: {}", failed_title, err);
                self.dialog.show_message(failed_title, &err.user_message()).await;
                Self::failed(&err)
            }
        }
    }

    fn failed(err: &SyncError) -> SyncOutcome {
        SyncOutcome::Failed {
            category: err.category(),
            message: err.user_message(),
        }
    }
}
