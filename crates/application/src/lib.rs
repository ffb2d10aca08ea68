//! 应用层实现。
//!
//! 这里提供围绕领域模型的用例服务，处理输入校验，
//! 以及对外部适配器（密码哈希、认证、消息广播）的抽象。

pub mod authenticator;
pub mod broadcaster;
pub mod clock;
pub mod error;
pub mod frames;
pub mod password;
pub mod services;

pub use authenticator::{AuthError, Authenticator};
pub use broadcaster::{BroadcastError, MessageBroadcaster};
pub use clock::{Clock, SystemClock};
pub use error::ApplicationError;
pub use frames::{ClientFrame, ServerFrame};
pub use password::{PasswordHasher, PasswordHasherError};
pub use services::{
    AuthenticateUserRequest, MessageService, MessageServiceDependencies, RegisterUserRequest,
    UserService, UserServiceDependencies,
};
