//! 领域模型错误定义

use thiserror::Error;

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 输入校验失败
    #[error("{field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    /// 用户已存在（邮箱重复）
    #[error("user already exists")]
    UserAlreadyExists,

    /// 用户不存在
    #[error("user not found")]
    UserNotFound,
}

impl DomainError {
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// 仓储层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("storage error: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

/// 领域模型结果类型
pub type DomainResult<T> = Result<T, DomainError>;
