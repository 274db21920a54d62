//! 同步调度器
//!
//! 平台定时器的替身：按固定周期调用无人值守同步入口。
//! - 只有启用自动上传时才会登记周期任务
//! - 每次触发前检查网络约束，不满足时推迟到下一次触发
//! - 触发时机不可靠（可能重复或遗漏），正确性由编排器的幂等性保证
//!
//! ```text
//! [interval tick] ─┐
//!                  ├── run_job() ──► 网络约束 ──► BackupOrchestrator::run_unattended_sync()
//! [手动触发]  ─────┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::job::{JobConstraints, JobResult, TriggerSource};
use crate::backup::BackupOrchestrator;
use crate::network::NetworkMonitor;
use crate::settings::SettingsStore;

/// 调度器状态（用于外部查询）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerStatus {
    /// 是否已登记周期任务
    pub scheduled: bool,
    /// 触发周期
    pub period: Option<Duration>,
    /// 执行次数
    pub run_count: u64,
    /// 实际传输（上传或恢复）的次数
    pub transfer_count: u64,
    /// 失败次数
    pub failure_count: u64,
    /// 因约束推迟的次数
    pub deferred_count: u64,
    /// 最后触发来源
    pub last_trigger: Option<TriggerSource>,
}

/// 已登记的周期任务
struct ScheduledJob {
    period: Duration,
    cancel_token: CancellationToken,
    handle: JoinHandle<()>,
}

/// 同步调度器
pub struct SyncScheduler {
    /// 备份编排器
    orchestrator: Arc<BackupOrchestrator>,
    /// 设置存储
    settings: Arc<dyn SettingsStore>,
    /// 网络状态
    network: Arc<dyn NetworkMonitor>,
    /// 运行约束
    constraints: JobConstraints,
    /// 当前周期任务
    job: Mutex<Option<ScheduledJob>>,
    /// 最后触发来源
    last_trigger: RwLock<Option<TriggerSource>>,
    /// 执行次数统计
    run_count: AtomicU64,
    /// 传输次数统计
    transfer_count: AtomicU64,
    /// 失败次数统计
    failure_count: AtomicU64,
    /// 推迟次数统计
    deferred_count: AtomicU64,
}

impl SyncScheduler {
    /// 创建新的同步调度器
    pub fn new(
        orchestrator: Arc<BackupOrchestrator>,
        settings: Arc<dyn SettingsStore>,
        network: Arc<dyn NetworkMonitor>,
        constraints: JobConstraints,
    ) -> Self {
        Self {
            orchestrator,
            settings,
            network,
            constraints,
            job: Mutex::new(None),
            last_trigger: RwLock::new(None),
            run_count: AtomicU64::new(0),
            transfer_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
            deferred_count: AtomicU64::new(0),
        }
    }

    /// 登记周期同步
    ///
    /// # 返回值
    /// - `true`: 已登记（替换之前的周期任务）
    /// - `false`: 自动上传未启用，未登记
    pub async fn schedule(self: &Arc<Self>, interval_hours: u32) -> Result<bool> {
        if interval_hours == 0 {
            bail!("同步间隔必须大于 0 小时");
        }

        // 开关检查与写入在同一次同步锁内完成
        let settings = self
            .orchestrator
            .update_settings_locked(|s| {
                if s.is_backup_autoupload_enabled {
                    s.sync_interval_hours = Some(interval_hours);
                }
            })
            .await
            .context("Failed to persist sync interval")?;
        if !settings.is_backup_autoupload_enabled {
            info!("自动上传未启用，不登记周期同步");
            self.cancel();
            return Ok(false);
        }

        self.schedule_with_period(Duration::from_secs(u64::from(interval_hours) * 3600))?;
        Ok(true)
    }

    /// 按任意周期登记（不检查开关，不持久化）
    pub fn schedule_with_period(self: &Arc<Self>, period: Duration) -> Result<()> {
        if period.is_zero() {
            bail!("同步周期必须大于 0");
        }

        let cancel_token = CancellationToken::new();
        let scheduler = Arc::clone(self);
        let token = cancel_token.clone();
        let handle = tokio::spawn(async move { scheduler.run_loop(period, token).await });

        let previous = self.job.lock().replace(ScheduledJob {
            period,
            cancel_token,
            handle,
        });
        if let Some(previous) = previous {
            debug!("替换已登记的周期同步 (period={:?})", previous.period);
            previous.cancel_token.cancel();
        }

        info!(
            "已登记周期同步: period={:?}, constraints={:?}",
            period, self.constraints
        );
        Ok(())
    }

    /// 按持久化的设置恢复周期任务（进程启动时调用）
    pub async fn restore(self: &Arc<Self>) -> Result<bool> {
        if !self.constraints.persisted {
            return Ok(false);
        }

        let settings = self.settings.load().await.context("Failed to load settings")?;
        match settings.sync_interval_hours {
            Some(hours) if settings.is_backup_autoupload_enabled => self.schedule(hours).await,
            Some(_) => {
                info!("自动上传未启用，不恢复周期同步");
                Ok(false)
            }
            None => {
                debug!("没有已登记的同步间隔");
                Ok(false)
            }
        }
    }

    /// 停止周期任务并等待执行中的同步结束
    pub async fn shutdown(&self) {
        let job = self.job.lock().take();
        if let Some(job) = job {
            info!("停止周期同步 (period={:?})", job.period);
            job.cancel_token.cancel();
            if let Err(e) = job.handle.await {
                error!("周期同步任务异常退出: {}", e);
            }
        }
    }

    /// 取消周期任务
    ///
    /// 正在执行的同步会继续跑完
    pub fn cancel(&self) {
        if let Some(job) = self.job.lock().take() {
            info!("取消周期同步 (period={:?})", job.period);
            job.cancel_token.cancel();
        }
    }

    /// 是否已登记周期任务
    pub fn is_scheduled(&self) -> bool {
        self.job
            .lock()
            .as_ref()
            .map(|job| !job.handle.is_finished())
            .unwrap_or(false)
    }

    /// 执行一次同步任务
    pub async fn run_job(&self, trigger: TriggerSource) -> JobResult {
        *self.last_trigger.write() = Some(trigger);

        let state = self.network.current_state();
        if !self.constraints.required_network.is_satisfied_by(state) {
            self.deferred_count.fetch_add(1, Ordering::Relaxed);
            info!(
                "网络状态 {} 不满足要求 {:?}，推迟本次同步（触发来源: {}）",
                state, self.constraints.required_network, trigger
            );
            return JobResult::Deferred;
        }

        self.run_count.fetch_add(1, Ordering::Relaxed);
        info!("开始执行同步任务（触发来源: {}）", trigger);
        let start = std::time::Instant::now();

        let result = match self.orchestrator.run_unattended_sync().await {
            Ok(outcome) => {
                if outcome.transferred() {
                    self.transfer_count.fetch_add(1, Ordering::Relaxed);
                }
                JobResult::Completed(outcome)
            }
            Err(e) => JobResult::Failed(e.to_string()),
        };

        if result.is_failure() {
            self.failure_count.fetch_add(1, Ordering::Relaxed);
            warn!("同步任务失败，耗时 {:?}: {:?}", start.elapsed(), result);
        } else {
            info!("同步任务完成，耗时 {:?}: {:?}", start.elapsed(), result);
        }
        result
    }

    /// 获取调度器状态
    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            scheduled: self.is_scheduled(),
            period: self.job.lock().as_ref().map(|job| job.period),
            run_count: self.run_count.load(Ordering::Relaxed),
            transfer_count: self.transfer_count.load(Ordering::Relaxed),
            failure_count: self.failure_count.load(Ordering::Relaxed),
            deferred_count: self.deferred_count.load(Ordering::Relaxed),
            last_trigger: *self.last_trigger.read(),
        }
    }

    async fn run_loop(self: Arc<Self>, period: Duration, cancel_token: CancellationToken) {
        info!("周期同步循环已启动 (period={:?})", period);

        // 第一次触发在一个周期之后
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = cancel_token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            // 已开始的同步不中途打断
            if let JobResult::Failed(ref e) = self.run_job(TriggerSource::Timer).await {
                error!("周期同步出现意外错误: {}", e);
            }
        }

        info!("周期同步循环已退出");
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        if let Some(job) = self.job.get_mut().take() {
            job.cancel_token.cancel();
        }
    }
}
