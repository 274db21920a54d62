//! 用户对话能力
//!
//! 核心只调用这组能力，不实现任何界面。命令行使用终端实现，
//! 守护进程使用无头实现（只记录日志，所有确认一律回答"否"）。

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// 用户对话能力
#[async_trait]
pub trait DialogService: Send + Sync {
    /// 显示消息
    async fn show_message(&self, title: &str, body: &str);

    /// 显示确认框，返回用户是否选择"是"
    async fn show_confirm(&self, title: &str, body: &str, yes_label: &str, no_label: &str) -> bool;

    /// 显示加载状态
    async fn show_loading(&self);

    /// 隐藏加载状态
    async fn hide_loading(&self);
}

/// 终端对话
#[derive(Debug, Default)]
pub struct TerminalDialog;

impl TerminalDialog {
    /// 创建终端对话
    pub fn new() -> Self {
        Self
    }

    fn is_yes(answer: &str, yes_label: &str) -> bool {
        let answer = answer.trim();
        answer.eq_ignore_ascii_case("y")
            || answer.eq_ignore_ascii_case("yes")
            || answer == yes_label
    }
}

#[async_trait]
impl DialogService for TerminalDialog {
    async fn show_message(&self, title: &str, body: &str) {
        println!("【{}】{}", title, body);
    }

    async fn show_confirm(&self, title: &str, body: &str, yes_label: &str, no_label: &str) -> bool {
        println!("【{}】{}", title, body);
        println!("输入 y/{} 确认，其他任意输入视为 {}:", yes_label, no_label);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        match lines.next_line().await {
            Ok(Some(answer)) => Self::is_yes(&answer, yes_label),
            Ok(None) => false,
            Err(e) => {
                warn!("读取终端输入失败: {}", e);
                false
            }
        }
    }

    async fn show_loading(&self) {
        println!("处理中，请稍候...");
    }

    async fn hide_loading(&self) {}
}

/// 无头对话（无人值守环境）
#[derive(Debug, Default)]
pub struct HeadlessDialog;

#[async_trait]
impl DialogService for HeadlessDialog {
    async fn show_message(&self, title: &str, body: &str) {
        info!("[{}] {}", title, body);
    }

    async fn show_confirm(&self, title: &str, _body: &str, _yes_label: &str, _no_label: &str) -> bool {
        warn!("无人值守环境无法确认「{}」，按否处理", title);
        false
    }

    async fn show_loading(&self) {}

    async fn hide_loading(&self) {}
}
