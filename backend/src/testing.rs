// 测试替身：内存远端存储、脚本化对话、内存数据库

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::auth::{SessionManager, SessionOptions};
use crate::backup::{BackupOrchestrator, OrchestratorOptions};
use crate::database::{BackupSnapshot, LocalDatabase};
use crate::dialog::{DialogService, HeadlessDialog};
use crate::network::StaticNetworkMonitor;
use crate::remote::{LoginMode, ProviderSession, RemoteError, RemoteStore};
use crate::settings::{MemorySettingsStore, SettingsStore, SyncSettings};

/// 远端操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Exists,
    Upload,
    Download,
    LastModified,
    Login,
    Logout,
}

/// 注入的故障
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    AuthCancelled,
    AuthFailed,
    Service,
    /// 以服务错误形式返回的令牌失效码
    ExpiredToken,
    Network,
    /// 永不返回（用于超时测试）
    Hang,
}

impl Failure {
    fn to_error(self) -> RemoteError {
        match self {
            Failure::AuthCancelled => RemoteError::AuthenticationCancelled,
            Failure::AuthFailed => RemoteError::AuthenticationFailed("token rejected".to_string()),
            Failure::Service => RemoteError::Service {
                code: "500".to_string(),
                message: "internal error".to_string(),
            },
            Failure::ExpiredToken => RemoteError::Service {
                code: "4f37.717b".to_string(),
                message: "token expired".to_string(),
            },
            Failure::Network | Failure::Hang => RemoteError::Network("connection reset".to_string()),
        }
    }
}

/// 调用计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub exists: usize,
    pub upload: usize,
    pub download: usize,
    pub last_modified: usize,
    pub login: usize,
    pub logout: usize,
}

#[derive(Default)]
struct FakeRemoteState {
    stored: Option<(Vec<u8>, DateTime<Utc>)>,
    authenticated: bool,
    failures: HashMap<Op, Failure>,
    calls: CallCounts,
}

/// 内存远端存储
#[derive(Default)]
pub struct FakeRemote {
    state: Mutex<FakeRemoteState>,
}

impl FakeRemote {
    /// 云端没有备份
    pub fn empty() -> Self {
        Self::default()
    }

    /// 云端已有备份
    pub fn with_backup(payload: &[u8], last_modified: DateTime<Utc>) -> Self {
        let remote = Self::default();
        remote.state.lock().stored = Some((payload.to_vec(), last_modified));
        remote
    }

    pub fn fail(&self, op: Op, failure: Failure) {
        self.state.lock().failures.insert(op, failure);
    }

    pub fn clear_failures(&self) {
        self.state.lock().failures.clear();
    }

    pub fn calls(&self) -> CallCounts {
        self.state.lock().calls
    }

    /// 所有远端调用次数之和
    pub fn network_calls(&self) -> usize {
        let c = self.calls();
        c.exists + c.upload + c.download + c.last_modified + c.login + c.logout
    }

    pub fn stored(&self) -> Option<(Vec<u8>, DateTime<Utc>)> {
        self.state.lock().stored.clone()
    }

    pub fn set_authenticated(&self, authenticated: bool) {
        self.state.lock().authenticated = authenticated;
    }

    /// 计数并检查注入的故障
    async fn enter(&self, op: Op) -> Result<(), RemoteError> {
        let failure = {
            let mut state = self.state.lock();
            let calls = &mut state.calls;
            match op {
                Op::Exists => calls.exists += 1,
                Op::Upload => calls.upload += 1,
                Op::Download => calls.download += 1,
                Op::LastModified => calls.last_modified += 1,
                Op::Login => calls.login += 1,
                Op::Logout => calls.logout += 1,
            }
            state.failures.get(&op).copied()
        };

        match failure {
            None => Ok(()),
            Some(Failure::Hang) => {
                tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
                Err(Failure::Hang.to_error())
            }
            Some(f) => Err(f.to_error()),
        }
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn exists(&self) -> Result<bool, RemoteError> {
        self.enter(Op::Exists).await?;
        Ok(self.state.lock().stored.is_some())
    }

    async fn upload(&self, snapshot: &BackupSnapshot) -> Result<(), RemoteError> {
        self.enter(Op::Upload).await?;
        self.state.lock().stored = Some((snapshot.payload().to_vec(), snapshot.produced_at()));
        Ok(())
    }

    async fn download(&self) -> Result<Vec<u8>, RemoteError> {
        self.enter(Op::Download).await?;
        self.state
            .lock()
            .stored
            .as_ref()
            .map(|(bytes, _)| bytes.clone())
            .ok_or_else(|| RemoteError::NotFound("ledger.backup".to_string()))
    }

    async fn last_modified(&self) -> Result<DateTime<Utc>, RemoteError> {
        self.enter(Op::LastModified).await?;
        self.state
            .lock()
            .stored
            .as_ref()
            .map(|(_, ts)| *ts)
            .ok_or_else(|| RemoteError::NotFound("ledger.backup".to_string()))
    }

    async fn login(&self, _mode: LoginMode) -> Result<ProviderSession, RemoteError> {
        self.enter(Op::Login).await?;
        self.state.lock().authenticated = true;
        Ok(ProviderSession::new("fake@example.com".to_string(), "fake-token".to_string()))
    }

    async fn logout(&self) -> Result<(), RemoteError> {
        // 本地会话总会被清除
        self.state.lock().authenticated = false;
        self.enter(Op::Logout).await
    }

    fn is_authenticated(&self) -> bool {
        self.state.lock().authenticated
    }
}

/// 对话事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
    Message { title: String, body: String },
    Confirm { title: String, body: String },
    ShowLoading,
    HideLoading,
}

/// 按脚本回答确认框的对话服务，回答用完后一律拒绝
#[derive(Default)]
pub struct ScriptedDialog {
    answers: Mutex<VecDeque<bool>>,
    events: Mutex<Vec<DialogEvent>>,
}

impl ScriptedDialog {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<DialogEvent> {
        self.events.lock().clone()
    }

    pub fn confirm_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, DialogEvent::Confirm { .. }))
            .count()
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                DialogEvent::Message { title, body } => Some((title.clone(), body.clone())),
                _ => None,
            })
            .collect()
    }

    /// 加载状态严格成对、不嵌套，且加载期间没有弹出确认框
    pub fn loading_balanced(&self) -> bool {
        let mut loading = false;
        for event in self.events.lock().iter() {
            match event {
                DialogEvent::ShowLoading if loading => return false,
                DialogEvent::ShowLoading => loading = true,
                DialogEvent::HideLoading if !loading => return false,
                DialogEvent::HideLoading => loading = false,
                DialogEvent::Confirm { .. } if loading => return false,
                _ => {}
            }
        }
        !loading
    }

    pub fn loading_phases(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, DialogEvent::ShowLoading))
            .count()
    }
}

#[async_trait]
impl DialogService for ScriptedDialog {
    async fn show_message(&self, title: &str, body: &str) {
        self.events.lock().push(DialogEvent::Message {
            title: title.to_string(),
            body: body.to_string(),
        });
    }

    async fn show_confirm(&self, title: &str, body: &str, _yes_label: &str, _no_label: &str) -> bool {
        self.events.lock().push(DialogEvent::Confirm {
            title: title.to_string(),
            body: body.to_string(),
        });
        self.answers.lock().pop_front().unwrap_or(false)
    }

    async fn show_loading(&self) {
        self.events.lock().push(DialogEvent::ShowLoading);
    }

    async fn hide_loading(&self) {
        self.events.lock().push(DialogEvent::HideLoading);
    }
}

#[derive(Default)]
struct MemoryDatabaseState {
    payload: Vec<u8>,
    last_modified: Option<DateTime<Utc>>,
    replace_count: usize,
    fail_replace: bool,
}

/// 内存数据库
#[derive(Default)]
pub struct MemoryDatabase {
    state: Mutex<MemoryDatabaseState>,
}

impl MemoryDatabase {
    pub fn new(payload: &[u8], last_modified: Option<DateTime<Utc>>) -> Self {
        Self {
            state: Mutex::new(MemoryDatabaseState {
                payload: payload.to_vec(),
                last_modified,
                ..Default::default()
            }),
        }
    }

    pub fn payload(&self) -> Vec<u8> {
        self.state.lock().payload.clone()
    }

    pub fn replace_count(&self) -> usize {
        self.state.lock().replace_count
    }

    pub fn fail_replace(&self) {
        self.state.lock().fail_replace = true;
    }
}

#[async_trait]
impl LocalDatabase for MemoryDatabase {
    async fn export(&self) -> Result<Vec<u8>> {
        Ok(self.payload())
    }

    async fn replace(&self, payload: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_replace {
            return Err(anyhow!("disk full"));
        }
        state.payload = payload.to_vec();
        state.replace_count += 1;
        Ok(())
    }

    async fn last_modified(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.state.lock().last_modified)
    }
}

/// 每次读取都要等待一段时间的设置存储，用来拉开读改写的时间窗
pub struct SlowSettingsStore {
    inner: MemorySettingsStore,
    delay: Duration,
}

impl SlowSettingsStore {
    pub fn new(settings: SyncSettings, delay: Duration) -> Self {
        Self {
            inner: MemorySettingsStore::new(settings),
            delay,
        }
    }

    pub fn snapshot(&self) -> SyncSettings {
        self.inner.snapshot()
    }
}

#[async_trait]
impl SettingsStore for SlowSettingsStore {
    async fn load(&self) -> Result<SyncSettings> {
        tokio::time::sleep(self.delay).await;
        self.inner.load().await
    }

    async fn save(&self, settings: &SyncSettings) -> Result<()> {
        self.inner.save(settings).await
    }
}

/// 无人值守场景用的编排器（无头对话、空内存数据库）
pub fn orchestrator_for(
    remote: Arc<FakeRemote>,
    settings: Arc<dyn SettingsStore>,
    network: Arc<StaticNetworkMonitor>,
) -> Arc<BackupOrchestrator> {
    let session = Arc::new(SessionManager::new(
        remote.clone(),
        settings.clone(),
        SessionOptions::default(),
    ));
    Arc::new(BackupOrchestrator::new(
        session,
        remote,
        Arc::new(MemoryDatabase::default()),
        settings,
        Arc::new(HeadlessDialog),
        network,
        OrchestratorOptions::default(),
    ))
}
