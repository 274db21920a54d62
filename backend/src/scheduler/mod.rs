//! 调度器模块

pub mod job;
pub mod sync_scheduler;

pub use job::{JobConstraints, JobResult, TriggerSource};
pub use sync_scheduler::{SchedulerStatus, SyncScheduler};
