// 对话文案常量

/// 确认按钮
pub const YES_LABEL: &str = "是";

/// 取消按钮
pub const NO_LABEL: &str = "否";

// ==================== 覆盖确认 ====================

/// 覆盖确认标题
pub const OVERWRITE_TITLE: &str = "覆盖确认";

/// 备份前确认：覆盖云端备份
pub const OVERWRITE_BACKUP_MESSAGE: &str = "这将覆盖云端已有的备份，确定继续吗？";

/// 恢复前确认：覆盖本地数据
pub const OVERWRITE_DATA_MESSAGE: &str = "这将用云端备份覆盖本地数据，确定继续吗？";

/// 强制覆盖标题
pub const FORCE_OVERRIDE_TITLE: &str = "本地数据较新";

/// 强制覆盖确认：本地数据比云端新
pub const FORCE_OVERRIDE_MESSAGE: &str =
    "本地数据比云端备份更新，恢复后本地较新的修改将丢失。确定要覆盖吗？";

// ==================== 结果提示 ====================

/// 成功标题
pub const SUCCESS_TITLE: &str = "完成";

/// 成功提示
pub const TASK_SUCCESSFUL_MESSAGE: &str = "操作已成功完成";

/// 取消标题
pub const CANCELED_TITLE: &str = "已取消";

/// 登录取消
pub const LOGIN_CANCELED_MESSAGE: &str = "登录已取消";

/// 登出取消
pub const LOGOUT_CANCELED_MESSAGE: &str = "登出已取消";

/// 备份取消
pub const UPLOAD_BACKUP_CANCELED_MESSAGE: &str = "备份上传已取消";

/// 恢复取消
pub const RESTORE_BACKUP_CANCELED_MESSAGE: &str = "备份恢复已取消";

/// 认证失败标题
pub const AUTHENTICATION_FAILED_TITLE: &str = "认证失败";

/// 认证失败提示
pub const AUTHENTICATION_FAILED_MESSAGE: &str = "登录凭证已失效，已自动登出，请重新登录";

/// 登录失败标题
pub const LOGIN_FAILED_TITLE: &str = "登录失败";

/// 备份失败标题
pub const BACKUP_FAILED_TITLE: &str = "备份失败";

/// 恢复失败标题
pub const RESTORE_FAILED_TITLE: &str = "恢复失败";

/// 通用错误标题
pub const GENERAL_ERROR_TITLE: &str = "错误";

/// 无网络标题
pub const NO_NETWORK_TITLE: &str = "无网络";

/// 无网络提示
pub const NO_NETWORK_MESSAGE: &str = "当前没有网络连接，请检查网络后重试";

/// 无备份标题
pub const NO_BACKUP_TITLE: &str = "没有备份";

/// 无备份提示
pub const NO_BACKUP_MESSAGE: &str = "云端还没有可恢复的备份";

/// 忙碌标题
pub const BUSY_TITLE: &str = "请稍候";

/// 忙碌提示
pub const BUSY_MESSAGE: &str = "已有同步操作正在进行，请稍后再试";
