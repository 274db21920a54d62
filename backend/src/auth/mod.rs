// 认证模块

pub mod session;

pub use session::{AuthError, SessionManager, SessionOptions, SessionState};
