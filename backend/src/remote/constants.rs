// 云盘提供方错误码常量
//
// 各家 SDK 的错误码只在这里出现一次，核心流程只看 RemoteError 分类

/// 备份文件默认名称
pub const DEFAULT_BACKUP_FILE_NAME: &str = "ledger.backup";

/// 元数据附属文件后缀
pub const METADATA_SUFFIX: &str = ".meta.json";

// ==================== 认证失败 ====================

/// 会被视为认证失败（需要强制登出）的错误码
///
/// - `4f37.717b`: OneDrive Graph 返回的令牌失效码
/// - `authenticationFailure`: OneDrive SDK 认证失败
/// - `InvalidAuthenticationToken`: Graph API 令牌无效
/// - `unauthenticated`: 通用 401
pub const AUTH_FAILURE_CODES: &[&str] = &[
    "4f37.717b",
    "authenticationFailure",
    "InvalidAuthenticationToken",
    "unauthenticated",
];

// ==================== 用户取消 ====================

/// 会被视为用户主动取消登录的错误码
pub const AUTH_CANCELLED_CODES: &[&str] = &["authenticationCancelled", "access_denied"];

// ==================== 远端不存在 ====================

/// 远端对象不存在
pub const NOT_FOUND_CODES: &[&str] = &["itemNotFound", "404"];

/// 提供方错误码的分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderCodeKind {
    /// 认证失败
    AuthenticationFailed,
    /// 用户取消认证
    AuthenticationCancelled,
    /// 对象不存在
    NotFound,
    /// 其他服务端错误
    Service,
}

/// 按错误码表对提供方错误码分类（大小写不敏感）
pub fn classify_provider_code(code: &str) -> ProviderCodeKind {
    let matches = |table: &[&str]| table.iter().any(|c| c.eq_ignore_ascii_case(code));

    if matches(AUTH_CANCELLED_CODES) {
        ProviderCodeKind::AuthenticationCancelled
    } else if matches(AUTH_FAILURE_CODES) {
        ProviderCodeKind::AuthenticationFailed
    } else if matches(NOT_FOUND_CODES) {
        ProviderCodeKind::NotFound
    } else {
        ProviderCodeKind::Service
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_codes() {
        assert_eq!(
            classify_provider_code("4f37.717b"),
            ProviderCodeKind::AuthenticationFailed
        );
        assert_eq!(
            classify_provider_code("AuthenticationCancelled"),
            ProviderCodeKind::AuthenticationCancelled
        );
        assert_eq!(classify_provider_code("itemNotFound"), ProviderCodeKind::NotFound);
    }

    #[test]
    fn test_classify_unknown_code_is_service() {
        assert_eq!(classify_provider_code("quotaLimitReached"), ProviderCodeKind::Service);
        assert_eq!(classify_provider_code(""), ProviderCodeKind::Service);
    }
}
