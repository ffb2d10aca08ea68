pub mod message_service;
pub mod user_service;

pub use message_service::{MessageService, MessageServiceDependencies};
pub use user_service::{
    AuthenticateUserRequest, RegisterUserRequest, UserService, UserServiceDependencies,
};
