use futures::future::BoxFuture;

use crate::errors::RepositoryError;
use crate::message::Message;
use crate::user::User;
use crate::value_objects::{UserEmail, UserId};

pub type RepositoryResult<T> = Result<T, RepositoryError>;
pub type RepositoryFuture<T> = BoxFuture<'static, RepositoryResult<T>>;

pub trait UserRepository: Send + Sync {
    fn create(&self, user: User) -> RepositoryFuture<User>;
    fn find_by_id(&self, id: UserId) -> RepositoryFuture<Option<User>>;
    fn find_by_email(&self, email: UserEmail) -> RepositoryFuture<Option<User>>;
}

pub trait MessageRepository: Send + Sync {
    fn create(&self, message: Message) -> RepositoryFuture<Message>;
    /// 按创建时间倒序返回全部消息（最新的在前）。
    fn list(&self) -> RepositoryFuture<Vec<Message>>;
}
