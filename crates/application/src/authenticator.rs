use async_trait::async_trait;
use domain::Identity;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// 凭证无效或已过期，客户端可换新凭证重试
    #[error("invalid credential")]
    InvalidCredential,

    /// 认证后端故障（例如用户查询失败）
    #[error("auth backend error: {0}")]
    Backend(String),
}

impl AuthError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

/// 认证能力的抽象。
///
/// 校验一个 bearer 凭证并解析出连接身份；凭证的签发不在此接口范围内。
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn validate(&self, credential: &str) -> Result<Identity, AuthError>;
}
