//! 聊天服务核心领域模型
//!
//! 包含用户、消息、会话身份等核心实体，以及仓储接口定义。

pub mod errors;
pub mod identity;
pub mod message;
pub mod repository;
pub mod user;
pub mod value_objects;

// 重新导出常用类型
pub use errors::{DomainError, DomainResult, RepositoryError};
pub use identity::Identity;
pub use message::Message;
pub use repository::{MessageRepository, RepositoryFuture, RepositoryResult, UserRepository};
pub use user::User;
pub use value_objects::{
    MessageContent, MessageId, PasswordHash, Timestamp, UserEmail, UserId, Username,
};
