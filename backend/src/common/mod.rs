//! 公共模块
//!
//! 提供跨模块使用的通用组件

mod temp_file;

pub use temp_file::TempFileGuard;
