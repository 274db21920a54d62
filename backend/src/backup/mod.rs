//! 备份同步模块
//!
//! 决策函数、错误分类、编排器与结果类型

pub mod decision;
pub mod error;
pub mod messages;
pub mod orchestrator;
pub mod outcome;

pub use decision::{decide, ConflictPolicy, SyncAction, SyncIntent, UserConsent};
pub use error::{ErrorCategory, SyncError};
pub use orchestrator::{AuthMode, BackupOrchestrator, OrchestratorOptions};
pub use outcome::{BackupStatus, SkipReason, SyncOutcome};
