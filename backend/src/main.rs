use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ledger_backup::{
    AppConfig, BackupOrchestrator, DialogService, FileDatabase,
    FolderStore, HeadlessDialog, JobConstraints, JsonSettingsStore, SessionManager,
    SettingsStore, StaticNetworkMonitor, SyncScheduler, TerminalDialog,
};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// 账本数据库云端备份工具
#[derive(Debug, Parser)]
#[command(name = "ledger-backup", version, about)]
struct Cli {
    /// 配置文件路径
    #[arg(long, default_value = "config/app.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 登录备份服务
    Login,
    /// 登出备份服务
    Logout,
    /// 查看云端备份状态
    Status,
    /// 手动备份到云端
    Backup,
    /// 从云端恢复
    Restore,
    /// 执行一次无人值守同步
    Sync,
    /// 启用或停用自动上传
    Autoupload(AutouploadArgs),
    /// 登记周期同步间隔
    Schedule {
        /// 同步间隔（小时），默认取配置文件
        #[arg(long)]
        interval_hours: Option<u32>,
    },
    /// 后台运行周期同步，直到 Ctrl-C
    Daemon,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct AutouploadArgs {
    /// 启用
    #[arg(long)]
    enable: bool,
    /// 停用
    #[arg(long)]
    disable: bool,
}

/// 组装好的服务
struct Services {
    settings: Arc<JsonSettingsStore>,
    orchestrator: Arc<BackupOrchestrator>,
    scheduler: Arc<SyncScheduler>,
}

impl Services {
    fn build(config: &AppConfig, interactive: bool) -> Self {
        let remote = Arc::new(FolderStore::new(
            &config.backup.remote_dir,
            Some(config.backup.backup_file_name.clone()),
        ));
        let database = Arc::new(FileDatabase::new(&config.backup.database_path));
        let settings = Arc::new(JsonSettingsStore::new(&config.storage.settings_file));
        let network = Arc::new(StaticNetworkMonitor::new(config.network.state));
        let dialog: Arc<dyn DialogService> = if interactive {
            Arc::new(TerminalDialog::new())
        } else {
            Arc::new(HeadlessDialog)
        };

        let session = Arc::new(SessionManager::new(
            remote.clone(),
            settings.clone(),
            config.sync.session_options(),
        ));
        let orchestrator = Arc::new(BackupOrchestrator::new(
            session,
            remote,
            database,
            settings.clone(),
            dialog,
            network.clone(),
            config.sync.orchestrator_options(),
        ));
        let scheduler = Arc::new(SyncScheduler::new(
            orchestrator.clone(),
            settings.clone(),
            network,
            JobConstraints::default(),
        ));

        Self {
            settings,
            orchestrator,
            scheduler,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志系统
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(&cli.config).await;
    config.validate()?;

    let interactive = !matches!(cli.command, Command::Sync | Command::Daemon);
    let services = Services::build(&config, interactive);

    match cli.command {
        Command::Login => print_json(&services.orchestrator.login().await)?,
        Command::Logout => print_json(&services.orchestrator.logout().await)?,
        Command::Status => print_json(&services.orchestrator.refresh_backup_status().await)?,
        Command::Backup => print_json(&services.orchestrator.run_manual_backup().await)?,
        Command::Restore => print_json(&services.orchestrator.run_manual_restore().await)?,
        Command::Sync => {
            let outcome = services.orchestrator.run_unattended_sync().await?;
            print_json(&outcome)?;
        }
        Command::Autoupload(args) => {
            let enabled = args.enable && !args.disable;
            let settings = services
                .orchestrator
                .update_settings_locked(|s| s.is_backup_autoupload_enabled = enabled)
                .await?;
            info!("自动上传已{}", if enabled { "启用" } else { "停用" });
            print_json(&settings)?;
        }
        Command::Schedule { interval_hours } => {
            let hours = interval_hours.unwrap_or(config.sync.interval_hours);
            if services.scheduler.schedule(hours).await? {
                info!("已登记周期同步: 每 {} 小时，运行 daemon 命令后生效", hours);
            } else {
                warn!("自动上传未启用，未登记周期同步");
            }
            services.scheduler.cancel();
            print_json(&services.settings.load().await?)?;
        }
        Command::Daemon => {
            info!("Ledger Backup v{} 后台同步启动中...", env!("CARGO_PKG_VERSION"));
            if !services.scheduler.restore().await? {
                warn!("没有可恢复的周期同步（自动上传未启用或尚未登记间隔），等待退出信号");
            }

            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for shutdown signal")?;

            info!("收到退出信号，等待执行中的同步结束");
            services.scheduler.shutdown().await;
            info!("调度器状态: {:?}", services.scheduler.status());
        }
    }

    Ok(())
}
